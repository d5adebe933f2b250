//! JSON exporter

use super::exporter::Exporter;
use crate::error::Result;
use crate::types::TabularDataset;
use serde::Serialize;

/// MIME type of JSON exports
pub const JSON_MIME_TYPE: &str = "application/json";

/// Serialize any value to UTF-8 JSON
///
/// Pretty output uses two-space indentation.
pub fn to_json_bytes<T: Serialize + ?Sized>(data: &T, pretty: bool) -> Result<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(data)?
    } else {
        serde_json::to_vec(data)?
    };
    Ok(bytes)
}

/// JSON exporter for datasets; rows are written as they were given
pub struct JsonExporter {
    /// Whether to use pretty-print formatting
    pretty: bool,
}

impl JsonExporter {
    /// Create a new JSON exporter
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Create a pretty-printed JSON exporter
    pub fn pretty() -> Self {
        Self::new(true)
    }

    /// Create a compact JSON exporter
    pub fn compact() -> Self {
        Self::new(false)
    }
}

impl Exporter for JsonExporter {
    fn export(&self, dataset: &TabularDataset) -> Result<Vec<u8>> {
        to_json_bytes(dataset.rows(), self.pretty)
    }

    fn format_name(&self) -> &str {
        "json"
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn mime_type(&self) -> &str {
        JSON_MIME_TYPE
    }
}
