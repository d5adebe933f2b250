//! mi-core - Core library for mi-export
//!
//! This crate provides the shared pieces of the dashboard export toolkit:
//! the data model, error types, configuration, filename derivation, local
//! CSV/JSON/HTML formatting and the download trigger capability.

pub mod error;
pub mod types;
pub mod config;
pub mod download;
pub mod filename;
pub mod export;

pub use download::DownloadTrigger;
pub use error::{ExportError, Result};
pub use types::*;
