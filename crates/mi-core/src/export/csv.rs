//! CSV exporter
//!
//! Output is RFC 4180 style: fields containing a comma, a double quote or a
//! line break are quoted with embedded quotes doubled. The payload starts with
//! a UTF-8 byte-order mark so spreadsheet programs pick the right encoding for
//! non-Latin text.

use super::exporter::Exporter;
use crate::error::Result;
use crate::types::TabularDataset;
use serde_json::Value;
use std::borrow::Cow;
use std::io::Write;

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// MIME type of CSV exports
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// CSV exporter
#[derive(Debug, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new CSV exporter
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for CsvExporter {
    fn export(&self, dataset: &TabularDataset) -> Result<Vec<u8>> {
        to_csv_bytes(dataset)
    }

    fn format_name(&self) -> &str {
        "csv"
    }

    fn file_extension(&self) -> &str {
        "csv"
    }

    fn mime_type(&self) -> &str {
        CSV_MIME_TYPE
    }
}

/// Render a cell
///
/// Only a missing key or `null` becomes an empty field. `0`, `false` and `""`
/// are kept as they are.
pub fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

/// Write header and rows, without a byte-order mark
pub fn write_csv<W: Write>(dataset: &TabularDataset, writer: W) -> Result<()> {
    if let [column] = dataset.columns() {
        return write_single_column(dataset, column, writer);
    }

    let mut wtr = ::csv::Writer::from_writer(writer);

    wtr.write_record(dataset.columns())?;
    for row in dataset.rows() {
        let cells: Vec<String> = dataset
            .columns()
            .iter()
            .map(|column| format_cell(row.get(column)))
            .collect();
        wtr.write_record(&cells)?;
    }

    wtr.flush()?;
    Ok(())
}

/// One field per line, written directly
///
/// `csv::Writer` quotes a record made of a single empty field as `""`; here an
/// empty cell stays an empty line.
fn write_single_column<W: Write>(
    dataset: &TabularDataset,
    column: &str,
    mut writer: W,
) -> Result<()> {
    writeln!(writer, "{}", quote_field(column))?;
    for row in dataset.rows() {
        writeln!(writer, "{}", quote_field(&format_cell(row.get(column))))?;
    }
    writer.flush()?;
    Ok(())
}

fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Full CSV payload, byte-order mark included
pub fn to_csv_bytes(dataset: &TabularDataset) -> Result<Vec<u8>> {
    let mut out = UTF8_BOM.to_vec();
    write_csv(dataset, &mut out)?;
    Ok(out)
}
