//! Local export of in-memory data
//!
//! This module turns data the dashboard already holds into downloadable
//! files without a round trip to the export service.
//!
//! # Overview
//!
//! Export functionality supports:
//! - CSV (BOM-prefixed UTF-8, RFC 4180 quoting)
//! - JSON (pretty-printed or compact)
//! - HTML (standalone table report)
//!
//! # Example
//!
//! ```ignore
//! use mi_core::export::LocalExporter;
//!
//! let exporter = LocalExporter::new(trigger);
//! exporter.export_page_data("sales", rows, &["month", "amount"])?;
//! ```

mod csv;
mod exporter;
mod html;
mod json;

pub use self::csv::{format_cell, to_csv_bytes, write_csv, CsvExporter, CSV_MIME_TYPE, UTF8_BOM};
pub use exporter::{ExportManager, Exporter};
pub use html::{escape_html, HtmlExporter, HTML_MIME_TYPE};
pub use json::{to_json_bytes, JsonExporter, JSON_MIME_TYPE};

use crate::download::DownloadTrigger;
use crate::error::Result;
use crate::filename::{page_filename, page_filename_today};
use crate::types::{DownloadableFile, Row, TabularDataset};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// Exports in-memory data through a download trigger
pub struct LocalExporter<T: DownloadTrigger> {
    trigger: T,
    manager: ExportManager,
    pretty_json: bool,
}

impl<T: DownloadTrigger> LocalExporter<T> {
    /// Create an exporter with pretty JSON output
    pub fn new(trigger: T) -> Self {
        Self {
            trigger,
            manager: ExportManager::new(),
            pretty_json: true,
        }
    }

    /// Choose pretty or compact JSON
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self.manager = ExportManager::with_json_style(pretty);
        self
    }

    /// Save a dataset as CSV; defaults to `export.csv`
    pub fn export_csv(&self, dataset: &TabularDataset, filename: Option<&str>) -> Result<String> {
        self.export_dataset(dataset, "csv", filename)
    }

    /// Save any serializable value as JSON; defaults to `export.json`
    pub fn export_json<D: Serialize + ?Sized>(
        &self,
        data: &D,
        filename: Option<&str>,
    ) -> Result<String> {
        let content = to_json_bytes(data, self.pretty_json)?;
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("export.json");
        self.save(DownloadableFile::new(content, JSON_MIME_TYPE, filename))
    }

    /// Save a dataset as an HTML report titled after `title`
    pub fn export_html(
        &self,
        dataset: &TabularDataset,
        title: &str,
        filename: Option<&str>,
    ) -> Result<String> {
        let exporter = HtmlExporter::new(title);
        let content = exporter.export(dataset)?;
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| exporter.default_filename());
        self.save(DownloadableFile::new(content, HTML_MIME_TYPE, filename))
    }

    /// Save a dataset in any registered format
    pub fn export_dataset(
        &self,
        dataset: &TabularDataset,
        format: &str,
        filename: Option<&str>,
    ) -> Result<String> {
        let file = self.manager.export_file(dataset, format, filename)?;
        self.save(file)
    }

    /// Save page rows as `<label>_<today>.csv`
    pub fn export_page_data<S: AsRef<str>>(
        &self,
        label: &str,
        rows: Vec<Row>,
        columns: &[S],
    ) -> Result<String> {
        self.export_page_rows(page_filename_today(label), rows, columns)
    }

    /// Save page rows as `<label>_<date>.csv`
    pub fn export_page_data_on<S: AsRef<str>>(
        &self,
        label: &str,
        date: NaiveDate,
        rows: Vec<Row>,
        columns: &[S],
    ) -> Result<String> {
        self.export_page_rows(page_filename(label, date), rows, columns)
    }

    fn export_page_rows<S: AsRef<str>>(
        &self,
        filename: String,
        rows: Vec<Row>,
        columns: &[S],
    ) -> Result<String> {
        let dataset = TabularDataset::new(columns.iter().map(|c| c.as_ref()), rows)?;
        self.export_csv(&dataset, Some(&filename))
    }

    fn save(&self, file: DownloadableFile) -> Result<String> {
        let filename = file.filename();
        self.trigger.trigger(&file)?;
        info!("Exported {} bytes as {}", file.len(), filename);
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        files: Mutex<Vec<DownloadableFile>>,
    }

    impl DownloadTrigger for Recorder {
        fn trigger(&self, file: &DownloadableFile) -> Result<()> {
            self.files.lock().unwrap().push(file.clone());
            Ok(())
        }
    }

    fn rows(value: serde_json::Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_export_page_data_filename() {
        let recorder = Recorder::default();
        let exporter = LocalExporter::new(&recorder);
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let name = exporter
            .export_page_data_on(
                "sales",
                date,
                rows(json!([{ "month": "2024-03", "amount": 5200 }])),
                &["month", "amount"],
            )
            .unwrap();
        assert_eq!(name, "sales_2024-03-15.csv");

        let files = recorder.files.lock().unwrap();
        assert_eq!(files[0].suggested_filename, "sales_2024-03-15.csv");
        assert_eq!(files[0].mime_type, CSV_MIME_TYPE);
        assert!(files[0].content.starts_with(UTF8_BOM));
    }

    #[test]
    fn test_export_page_data_today() {
        let recorder = Recorder::default();
        let exporter = LocalExporter::new(&recorder);
        let name = exporter
            .export_page_data("inventory", Vec::new(), &["product"])
            .unwrap();
        assert_eq!(name, page_filename_today("inventory"));
    }

    #[test]
    fn test_dataset_json_follows_pretty_setting() {
        let recorder = Recorder::default();
        let dataset = TabularDataset::new(["a"], rows(json!([{ "a": 1 }]))).unwrap();

        LocalExporter::new(&recorder)
            .with_pretty_json(false)
            .export_dataset(&dataset, "json", None)
            .unwrap();
        LocalExporter::new(&recorder)
            .export_dataset(&dataset, "json", Some("pretty.json"))
            .unwrap();

        let files = recorder.files.lock().unwrap();
        assert_eq!(files[0].suggested_filename, "export.json");
        assert_eq!(files[0].content, b"[{\"a\":1}]");
        assert_eq!(
            String::from_utf8(files[1].content.clone()).unwrap(),
            "[\n  {\n    \"a\": 1\n  }\n]"
        );
    }

    #[test]
    fn test_export_json_defaults() {
        let recorder = Recorder::default();
        let exporter = LocalExporter::new(&recorder).with_pretty_json(false);
        let name = exporter.export_json(&json!({ "a": 1 }), None).unwrap();
        assert_eq!(name, "export.json");

        let files = recorder.files.lock().unwrap();
        assert_eq!(files[0].content, b"{\"a\":1}");
        assert_eq!(files[0].mime_type, "application/json");
    }

    #[test]
    fn test_export_csv_default_name() {
        let recorder = Recorder::default();
        let exporter = LocalExporter::new(&recorder);
        let dataset = TabularDataset::new(["a"], Vec::new()).unwrap();
        assert_eq!(exporter.export_csv(&dataset, None).unwrap(), "export.csv");
    }

    #[test]
    fn test_export_html_report() {
        let recorder = Recorder::default();
        let exporter = LocalExporter::new(&recorder);
        let dataset =
            TabularDataset::from_json(json!([{ "hospital": "协和", "score": 96.5 }]), None)
                .unwrap();

        let name = exporter.export_html(&dataset, "Medical", None).unwrap();
        assert_eq!(name, "export.html");
        let files = recorder.files.lock().unwrap();
        let html = String::from_utf8(files[0].content.clone()).unwrap();
        assert!(html.contains("<h1>Medical Report</h1>"));
    }

    #[test]
    fn test_page_data_without_columns_fails() {
        let recorder = Recorder::default();
        let exporter = LocalExporter::new(&recorder);
        let columns: [&str; 0] = [];
        let result = exporter.export_page_data("sales", Vec::new(), &columns);
        assert!(matches!(result, Err(ExportError::Validation(_))));
        assert!(recorder.files.lock().unwrap().is_empty());
    }

    #[test]
    fn test_trigger_failure_propagates() {
        struct Refusing;
        impl DownloadTrigger for Refusing {
            fn trigger(&self, _file: &DownloadableFile) -> Result<()> {
                Err(ExportError::DownloadUnavailable("disk full".to_string()))
            }
        }

        let exporter = LocalExporter::new(Refusing);
        let result = exporter.export_json(&json!([]), Some("x.json"));
        assert!(matches!(result, Err(ExportError::DownloadUnavailable(_))));
    }
}
