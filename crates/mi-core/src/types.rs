//! Core type definitions for mi-export

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Dataset identifier understood by the remote export service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Sales,
    Competitors,
    Customers,
    Inventory,
    Medical,
    /// Any identifier the service adds later
    Other(String),
}

impl DataType {
    /// The data types every export service deployment ships with
    pub fn known() -> [DataType; 5] {
        [
            DataType::Sales,
            DataType::Competitors,
            DataType::Customers,
            DataType::Inventory,
            DataType::Medical,
        ]
    }

    /// Wire identifier
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Sales => "sales",
            DataType::Competitors => "competitors",
            DataType::Customers => "customers",
            DataType::Inventory => "inventory",
            DataType::Medical => "medical",
            DataType::Other(s) => s,
        }
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "sales" => DataType::Sales,
            "competitors" => DataType::Competitors,
            "customers" => DataType::Customers,
            "inventory" => DataType::Inventory,
            "medical" => DataType::Medical,
            _ => DataType::Other(s),
        }
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        DataType::from(s.to_string())
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for DataType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(DataType::from(s))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats the remote service can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteFormat {
    #[default]
    Csv,
    Html,
}

impl RemoteFormat {
    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteFormat::Csv => "csv",
            RemoteFormat::Html => "html",
        }
    }

    /// MIME type expected for a payload in this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            RemoteFormat::Csv => "text/csv",
            RemoteFormat::Html => "text/html",
        }
    }
}

impl FromStr for RemoteFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(RemoteFormat::Csv),
            "html" => Ok(RemoteFormat::Html),
            other => Err(ExportError::Validation(format!(
                "Unsupported remote format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for RemoteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar filter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    /// Interpret a command-line token, preferring booleans and numbers over text
    pub fn parse(s: &str) -> Self {
        match s {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => s
                .parse::<serde_json::Number>()
                .map(Scalar::Number)
                .unwrap_or_else(|_| Scalar::Text(s.to_string())),
        }
    }
}

/// Filter condition attached to a remote export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Inclusive range, e.g. a date window
    Range { from: Scalar, to: Scalar },
    Scalar(Scalar),
}

impl FromStr for FilterValue {
    type Err = Infallible;

    /// `a..b` parses as a range, anything else as a scalar
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some((from, to)) = s.split_once("..") {
            if !from.is_empty() && !to.is_empty() {
                return Ok(FilterValue::Range {
                    from: Scalar::parse(from),
                    to: Scalar::parse(to),
                });
            }
        }
        Ok(FilterValue::Scalar(Scalar::parse(s)))
    }
}

/// Ordered filter map
pub type Filters = BTreeMap<String, FilterValue>;

/// Request for a server-rendered export
///
/// Built fresh per export action; the builder methods consume the request so a
/// sent request is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub data_type: DataType,
    pub format: RemoteFormat,
    #[serde(default)]
    pub filters: Filters,
}

impl ExportRequest {
    /// Create a request with no filters
    pub fn new(data_type: impl Into<DataType>, format: RemoteFormat) -> Self {
        Self {
            data_type: data_type.into(),
            format,
            filters: Filters::new(),
        }
    }

    /// Add a filter condition
    pub fn with_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    /// Replace all filters
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Filename used when the service does not suggest one
    pub fn fallback_filename(&self) -> String {
        format!("{}_export.csv", self.data_type)
    }
}

/// One row of a dataset, keyed by column
pub type Row = Map<String, Value>;

/// Ordered rows plus the column order used for output
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TabularDataset {
    /// Create a dataset; at least one column is required
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Row>,
    ) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(ExportError::Validation(
                "A dataset needs at least one column".to_string(),
            ));
        }
        Ok(Self { columns, rows })
    }

    /// Build a dataset from a JSON array of objects
    ///
    /// Without explicit columns, the column order is the order in which keys
    /// first appear across the rows.
    pub fn from_json(value: Value, columns: Option<Vec<String>>) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(ExportError::Validation(format!(
                    "Expected an array of rows, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(row) => rows.push(row),
                other => {
                    return Err(ExportError::Validation(format!(
                        "Row {} is {}, expected an object",
                        index,
                        json_kind(&other)
                    )))
                }
            }
        }

        let columns = columns.unwrap_or_else(|| {
            let mut seen: Vec<String> = Vec::new();
            for key in rows.iter().flat_map(|row| row.keys()) {
                if !seen.contains(key) {
                    seen.push(key.clone());
                }
            }
            seen
        });

        Self::new(columns, rows)
    }

    /// Column keys in output order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in output order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Terminal outcome of an export call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportResult {
    /// Successful export offered to the trigger as `filename`
    ///
    /// The trigger may store it under another name, e.g. `name (1).csv`.
    pub fn succeeded(filename: impl Into<String>) -> Self {
        Self {
            success: true,
            filename: Some(filename.into()),
            error: None,
        }
    }

    /// Failed export; the message is never empty
    pub fn failed(error: impl fmt::Display) -> Self {
        let mut message = error.to_string();
        if message.trim().is_empty() {
            message = "Export failed".to_string();
        }
        Self {
            success: false,
            filename: None,
            error: Some(message),
        }
    }
}

/// In-memory file waiting to be handed to a download trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadableFile {
    pub content: Vec<u8>,
    pub mime_type: String,
    pub suggested_filename: String,
}

impl DownloadableFile {
    /// Create a new downloadable file
    pub fn new(
        content: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        suggested_filename: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
            suggested_filename: suggested_filename.into(),
        }
    }

    /// Suggested filename, or `export.<ext>` derived from the MIME type
    pub fn filename(&self) -> String {
        if self.suggested_filename.trim().is_empty() {
            format!("export.{}", extension_for_mime(&self.mime_type))
        } else {
            self.suggested_filename.clone()
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// File extension for a MIME type, ignoring parameters such as `charset`
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "text/csv" => "csv",
        "application/json" => "json",
        "text/html" => "html",
        "text/plain" => "txt",
        _ => "bin",
    }
}
