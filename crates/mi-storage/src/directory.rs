//! Directory-backed download trigger

use mi_core::config::DownloadConfig;
use mi_core::error::{ExportError, Result};
use mi_core::{DownloadTrigger, DownloadableFile};
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Highest `name (n).ext` suffix tried before giving up
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Saves downloads into a directory
#[derive(Debug, Clone)]
pub struct DirectoryDownload {
    /// Target directory
    dir: PathBuf,
    /// Replace existing files instead of numbering new ones
    overwrite: bool,
    /// Largest payload accepted
    max_bytes: u64,
}

impl DirectoryDownload {
    /// Create a trigger that saves into `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let defaults = DownloadConfig::default();
        Self {
            dir: dir.into(),
            overwrite: defaults.overwrite,
            max_bytes: defaults.max_bytes,
        }
    }

    /// Create a trigger from configuration
    pub fn from_config(config: &DownloadConfig) -> Self {
        let dir = config
            .output_dir
            .clone()
            .unwrap_or_else(Self::default_dir);
        Self {
            dir,
            overwrite: config.overwrite,
            max_bytes: config.max_bytes,
        }
    }

    /// The user's download directory (~/Downloads as a fallback)
    pub fn default_dir() -> PathBuf {
        directories::UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|home| home.join("Downloads"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
    }

    /// Set whether existing files are replaced
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the payload size limit
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Get target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Name the payload is saved under, before collision numbering
    fn file_name(&self, file: &DownloadableFile) -> String {
        safe_file_name(&file.filename()).unwrap_or_else(|| {
            DownloadableFile::new(Vec::new(), file.mime_type.clone(), "").filename()
        })
    }

    /// Ensure the target directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                ExportError::DownloadUnavailable(format!(
                    "Failed to create download directory {}: {}",
                    self.dir.display(),
                    e
                ))
            })?;
            debug!("Created download directory: {:?}", self.dir);
        }
        Ok(())
    }

    /// Reserve the first free `name`, `name (1)`, `name (2)`... unless overwriting
    ///
    /// The reservation is an empty file created with `create_new`, so two
    /// concurrent saves never end up with the same path.
    fn claim_path(&self, name: &str) -> Result<PathBuf> {
        let first = self.dir.join(name);
        if self.overwrite {
            return Ok(first);
        }

        let path = Path::new(name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let numbered = (1..=MAX_NAME_ATTEMPTS)
            .map(|n| self.dir.join(format!("{} ({}){}", stem, n, extension)));

        for candidate in std::iter::once(first).chain(numbered) {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(_) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ExportError::DownloadUnavailable(format!(
                        "Failed to reserve {}: {}",
                        candidate.display(),
                        e
                    )))
                }
            }
        }

        warn!("No free name for {} after {} attempts", name, MAX_NAME_ATTEMPTS);
        Err(ExportError::DownloadUnavailable(format!(
            "No free name for {} in {}",
            name,
            self.dir.display()
        )))
    }
}

impl DownloadTrigger for DirectoryDownload {
    fn trigger(&self, file: &DownloadableFile) -> Result<()> {
        let size = file.len() as u64;
        if size > self.max_bytes {
            return Err(ExportError::DownloadUnavailable(format!(
                "payload of {} bytes exceeds the {} byte limit",
                size, self.max_bytes
            )));
        }

        self.ensure_dir()?;
        let name = self.file_name(file);

        let staged = StagedFile::create(&self.dir, &name)?;
        staged.write(&file.content).map_err(|e| {
            ExportError::Io(e).with_context(format!("Failed to write {}", name))
        })?;

        let final_path = self.claim_path(&name)?;
        if let Err(e) = staged.persist(&final_path) {
            if !self.overwrite {
                let _ = fs::remove_file(&final_path);
            }
            return Err(ExportError::Io(e).with_context(format!(
                "Failed to move download into {}",
                final_path.display()
            )));
        }

        info!(
            "Saved {} ({} bytes, {}) to {}",
            file.filename(),
            size,
            file.mime_type,
            final_path.display()
        );
        Ok(())
    }
}

/// Hidden `.part` file holding a payload until it is renamed into place
///
/// Dropping a staged file that was never persisted deletes it.
struct StagedFile {
    path: PathBuf,
    persisted: bool,
}

impl StagedFile {
    fn create(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(format!(".{}.{}.part", name, Uuid::new_v4().simple()));

        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                ExportError::DownloadUnavailable(format!(
                    "Failed to create staging file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            path,
            persisted: false,
        })
    }

    fn write(&self, content: &[u8]) -> std::io::Result<()> {
        let file = fs::OpenOptions::new().write(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    fn persist(mut self, final_path: &Path) -> std::io::Result<()> {
        fs::rename(&self.path, final_path)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.persisted {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("Failed to remove staging file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Last path component of a suggested name, or `None` if nothing usable is left
fn safe_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(last.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Barrier;
    use tempfile::TempDir;

    fn create_test_trigger() -> (DirectoryDownload, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let trigger = DirectoryDownload::new(temp_dir.path());
        (trigger, temp_dir)
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_save_file() {
        let (trigger, temp) = create_test_trigger();
        let file = DownloadableFile::new(b"month,amount\n".to_vec(), "text/csv", "sales.csv");

        trigger.trigger(&file).unwrap();

        let saved = fs::read(temp.path().join("sales.csv")).unwrap();
        assert_eq!(saved, b"month,amount\n");
        assert_eq!(entries(temp.path()), vec!["sales.csv"]);
    }

    #[test]
    fn test_empty_name_uses_mime_default() {
        let (trigger, temp) = create_test_trigger();
        let file = DownloadableFile::new(b"{}".to_vec(), "application/json", "");

        trigger.trigger(&file).unwrap();
        assert!(temp.path().join("export.json").exists());
    }

    #[test]
    fn test_collisions_are_numbered() {
        let (trigger, temp) = create_test_trigger();
        let file = DownloadableFile::new(b"a".to_vec(), "text/csv", "report.csv");

        trigger.trigger(&file).unwrap();
        trigger.trigger(&file).unwrap();
        trigger.trigger(&file).unwrap();

        assert_eq!(
            entries(temp.path()),
            vec!["report (1).csv", "report (2).csv", "report.csv"]
        );
    }

    #[test]
    fn test_concurrent_saves_keep_every_payload() {
        let (trigger, temp) = create_test_trigger();
        let barrier = Barrier::new(8);

        std::thread::scope(|scope| {
            for i in 0..8 {
                let trigger = &trigger;
                let barrier = &barrier;
                scope.spawn(move || {
                    let file = DownloadableFile::new(
                        format!("payload {}", i).into_bytes(),
                        "text/csv",
                        "report.csv",
                    );
                    barrier.wait();
                    trigger.trigger(&file).unwrap();
                });
            }
        });

        let names = entries(temp.path());
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"report.csv".to_string()));

        let mut payloads: Vec<String> = names
            .iter()
            .map(|name| fs::read_to_string(temp.path().join(name)).unwrap())
            .collect();
        payloads.sort();
        let expected: Vec<String> = (0..8).map(|i| format!("payload {}", i)).collect();
        assert_eq!(payloads, expected);
    }

    #[test]
    fn test_overwrite_replaces() {
        let (trigger, temp) = create_test_trigger();
        let trigger = trigger.with_overwrite(true);

        trigger
            .trigger(&DownloadableFile::new(b"old".to_vec(), "text/plain", "a.txt"))
            .unwrap();
        trigger
            .trigger(&DownloadableFile::new(b"new".to_vec(), "text/plain", "a.txt"))
            .unwrap();

        assert_eq!(fs::read(temp.path().join("a.txt")).unwrap(), b"new");
        assert_eq!(entries(temp.path()), vec!["a.txt"]);
    }

    #[test]
    fn test_path_components_are_stripped() {
        let (trigger, temp) = create_test_trigger();
        let file = DownloadableFile::new(b"x".to_vec(), "text/csv", "../../etc/evil.csv");

        trigger.trigger(&file).unwrap();
        assert_eq!(entries(temp.path()), vec!["evil.csv"]);

        let file = DownloadableFile::new(b"x".to_vec(), "text/csv", "..");
        trigger.trigger(&file).unwrap();
        assert!(temp.path().join("export.csv").exists());
    }

    #[test]
    fn test_oversized_payload_leaves_nothing() {
        let (trigger, temp) = create_test_trigger();
        let trigger = trigger.with_max_bytes(4);
        let file = DownloadableFile::new(b"too large".to_vec(), "text/csv", "big.csv");

        let result = trigger.trigger(&file);
        assert!(matches!(result, Err(ExportError::DownloadUnavailable(_))));
        assert!(entries(temp.path()).is_empty());
    }

    #[test]
    fn test_unavailable_directory() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let trigger = DirectoryDownload::new(blocker.join("downloads"));
        let file = DownloadableFile::new(b"x".to_vec(), "text/csv", "a.csv");

        let result = trigger.trigger(&file);
        assert!(matches!(result, Err(ExportError::DownloadUnavailable(_))));
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let trigger = DirectoryDownload::new(temp.path().join("nested/exports"));
        let file = DownloadableFile::new(b"x".to_vec(), "text/html", "r.html");

        trigger.trigger(&file).unwrap();
        assert!(temp.path().join("nested/exports/r.html").exists());
    }

    #[test]
    fn test_staged_file_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let staged = StagedFile::create(temp.path(), "a.csv").unwrap();
        staged.write(b"partial").unwrap();
        assert_eq!(entries(temp.path()).len(), 1);

        drop(staged);
        assert!(entries(temp.path()).is_empty());
    }

    #[test]
    fn test_from_config() {
        let temp = TempDir::new().unwrap();
        let config = DownloadConfig {
            output_dir: Some(temp.path().to_path_buf()),
            overwrite: true,
            max_bytes: 10,
        };
        let trigger = DirectoryDownload::from_config(&config);
        assert_eq!(trigger.dir(), temp.path());
        assert!(trigger.overwrite);
        assert_eq!(trigger.max_bytes, 10);
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("a.csv").as_deref(), Some("a.csv"));
        assert_eq!(safe_file_name("dir\\b.csv").as_deref(), Some("b.csv"));
        assert_eq!(safe_file_name("dir/").as_deref(), None);
    }
}
