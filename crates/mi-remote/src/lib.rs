//! mi-remote - Export service client for mi-export
//!
//! This crate talks to the remote analytics service that renders exports
//! server-side.
//!
//! ## Features
//!
//! - Server-rendered CSV/HTML exports saved through a download trigger
//! - Listing of the data types the service can export
//! - Service status reporting
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mi_core::{ExportRequest, RemoteFormat};
//! use mi_remote::ExportClient;
//!
//! let client = ExportClient::new(config.remote.clone())?;
//! let result = client
//!     .export_data(&ExportRequest::new("sales", RemoteFormat::Csv), &trigger)
//!     .await;
//! if !result.success {
//!     eprintln!("{}", result.error.unwrap_or_default());
//! }
//! ```

mod client;
pub mod model;

pub use client::{ExportClient, DATA_TYPES_PATH, EXPORT_DATA_PATH, STATUS_PATH};
pub use model::{DataTypeInfo, ServiceStatus};
