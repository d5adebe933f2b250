//! Exporter trait and manager

use crate::error::{ExportError, Result};
use crate::types::{DownloadableFile, TabularDataset};
use std::collections::HashMap;

/// Trait for dataset exporters
pub trait Exporter: Send + Sync {
    /// Serialize a dataset to bytes
    fn export(&self, dataset: &TabularDataset) -> Result<Vec<u8>>;

    /// Get the format name
    fn format_name(&self) -> &str;

    /// Get the file extension
    fn file_extension(&self) -> &str;

    /// MIME type of the produced payload
    fn mime_type(&self) -> &str;

    /// Filename used when the caller does not pick one
    fn default_filename(&self) -> String {
        format!("export.{}", self.file_extension())
    }
}

/// Manager for handling multiple export formats
pub struct ExportManager {
    exporters: HashMap<String, Box<dyn Exporter>>,
}

impl ExportManager {
    /// Create a new export manager with default exporters
    pub fn new() -> Self {
        Self::with_json_style(true)
    }

    /// Create a manager whose JSON exporter is pretty or compact
    pub fn with_json_style(pretty: bool) -> Self {
        let mut manager = Self {
            exporters: HashMap::new(),
        };

        manager.register(Box::new(super::csv::CsvExporter::new()));
        manager.register(Box::new(super::json::JsonExporter::new(pretty)));
        manager.register(Box::new(super::html::HtmlExporter::new("Export")));

        manager
    }

    /// Register a new exporter, replacing any with the same name
    pub fn register(&mut self, exporter: Box<dyn Exporter>) {
        self.exporters
            .insert(exporter.format_name().to_string(), exporter);
    }

    /// Export a dataset to the specified format
    pub fn export(&self, dataset: &TabularDataset, format: &str) -> Result<Vec<u8>> {
        self.require(format)?.export(dataset)
    }

    /// Export a dataset into a file ready for a download trigger
    pub fn export_file(
        &self,
        dataset: &TabularDataset,
        format: &str,
        filename: Option<&str>,
    ) -> Result<DownloadableFile> {
        let exporter = self.require(format)?;
        let content = exporter.export(dataset)?;
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| exporter.default_filename());

        Ok(DownloadableFile::new(content, exporter.mime_type(), filename))
    }

    /// Get list of available format names
    pub fn available_formats(&self) -> Vec<String> {
        let mut formats: Vec<_> = self.exporters.keys().cloned().collect();
        formats.sort();
        formats
    }

    /// Check if a format is available
    pub fn has_format(&self, format: &str) -> bool {
        self.exporters.contains_key(format)
    }

    /// Get an exporter by format name
    pub fn get(&self, format: &str) -> Option<&dyn Exporter> {
        self.exporters.get(format).map(|e| e.as_ref())
    }

    fn require(&self, format: &str) -> Result<&dyn Exporter> {
        self.get(format).ok_or_else(|| {
            ExportError::Validation(format!("Unknown export format: {}", format))
        })
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new()
    }
}
