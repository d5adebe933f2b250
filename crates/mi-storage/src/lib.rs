//! mi-storage - File system downloads for mi-export
//!
//! This crate provides the download trigger that saves export payloads into a
//! directory on disk.

mod directory;

pub use directory::DirectoryDownload;
