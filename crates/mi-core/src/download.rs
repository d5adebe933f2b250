//! Download trigger capability
//!
//! A download trigger turns an in-memory [`DownloadableFile`] into a file the
//! user can open. Implementations decide where the bytes end up; the
//! file system implementation lives in `mi-storage`.

use crate::error::Result;
use crate::types::DownloadableFile;

/// Persist a payload as a user-downloadable file
pub trait DownloadTrigger: Send + Sync {
    /// Save `file` under its suggested filename
    ///
    /// Any transient handle used to stage the payload is released before this
    /// returns, whether the save succeeded or not.
    fn trigger(&self, file: &DownloadableFile) -> Result<()>;
}

impl<T: DownloadTrigger + ?Sized> DownloadTrigger for &T {
    fn trigger(&self, file: &DownloadableFile) -> Result<()> {
        (**self).trigger(file)
    }
}

impl<T: DownloadTrigger + ?Sized> DownloadTrigger for Box<T> {
    fn trigger(&self, file: &DownloadableFile) -> Result<()> {
        (**self).trigger(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        saved: Mutex<Vec<String>>,
    }

    impl DownloadTrigger for Recorder {
        fn trigger(&self, file: &DownloadableFile) -> Result<()> {
            self.saved.lock().unwrap().push(file.filename());
            Ok(())
        }
    }

    struct Refusing;

    impl DownloadTrigger for Refusing {
        fn trigger(&self, _file: &DownloadableFile) -> Result<()> {
            Err(ExportError::DownloadUnavailable("no handle".to_string()))
        }
    }

    #[test]
    fn test_trigger_through_box() {
        let recorder = Recorder::default();
        {
            let boxed: Box<dyn DownloadTrigger + '_> = Box::new(&recorder);
            let file = DownloadableFile::new(b"x".to_vec(), "text/plain", "");
            boxed.trigger(&file).unwrap();
        }
        assert_eq!(*recorder.saved.lock().unwrap(), vec!["export.txt".to_string()]);
    }

    #[test]
    fn test_refusing_trigger() {
        let file = DownloadableFile::new(b"x".to_vec(), "text/csv", "a.csv");
        let result = Refusing.trigger(&file);
        assert!(matches!(result, Err(ExportError::DownloadUnavailable(_))));
    }
}
