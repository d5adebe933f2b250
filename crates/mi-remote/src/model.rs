//! Wire models for the export service

use mi_core::DataType;
use serde::{Deserialize, Serialize};

/// A data type the service can export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeInfo {
    /// Identifier sent back as `data_type`
    pub key: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DataTypeInfo {
    /// Entry with only a key
    pub fn from_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            description: None,
        }
    }

    /// Typed identifier
    pub fn data_type(&self) -> DataType {
        DataType::from(self.key.as_str())
    }

    /// Name for display, the key when the service sent none
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// `data_types` entries are either bare keys or described objects
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataTypeEntry {
    Key(String),
    Detailed(DataTypeInfo),
}

impl From<DataTypeEntry> for DataTypeInfo {
    fn from(entry: DataTypeEntry) -> Self {
        match entry {
            DataTypeEntry::Key(key) => DataTypeInfo::from_key(key),
            DataTypeEntry::Detailed(info) => info,
        }
    }
}

/// Body of `GET /api/export/data-types`
#[derive(Debug, Deserialize)]
pub(crate) struct DataTypesResponse {
    data_types: Vec<DataTypeEntry>,
}

impl DataTypesResponse {
    pub(crate) fn into_infos(self) -> Vec<DataTypeInfo> {
        self.data_types.into_iter().map(DataTypeInfo::from).collect()
    }
}

/// Body of `GET /api/export/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub supported_formats: Vec<String>,
    #[serde(default)]
    pub total_exports: u64,
    /// Timestamp as reported by the service
    #[serde(default)]
    pub last_check: Option<String>,
}
