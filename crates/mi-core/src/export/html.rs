//! HTML report exporter
//!
//! Renders a dataset as a standalone page with a single table, suitable for
//! printing or converting to PDF.

use super::csv::format_cell;
use super::exporter::Exporter;
use crate::error::Result;
use crate::types::TabularDataset;
use chrono::{DateTime, Local};

/// MIME type of HTML exports
pub const HTML_MIME_TYPE: &str = "text/html;charset=utf-8";

const STYLE: &str = "\
body { font-family: Arial, sans-serif; padding: 20px; }
h1 { color: #3b82f6; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th { background: #3b82f6; color: white; padding: 12px; text-align: left; }
td { border: 1px solid #ddd; padding: 10px; }
tr:nth-child(even) { background: #f9f9f9; }
.footer { margin-top: 30px; color: #666; font-size: 12px; }";

/// HTML report exporter
pub struct HtmlExporter {
    /// Report title
    title: String,
    /// Fixed generation time; the current time when unset
    generated_at: Option<DateTime<Local>>,
}

impl HtmlExporter {
    /// Create a new HTML exporter
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_at: None,
        }
    }

    /// Pin the generation timestamp shown in the report
    pub fn with_generated_at(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    fn render(&self, dataset: &TabularDataset) -> String {
        let generated_at = self.generated_at.unwrap_or_else(Local::now);
        let title = escape_html(&self.title);

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
        html.push_str(&format!("<title>{} Report</title>\n", title));
        html.push_str(&format!("<style>\n{}\n</style>\n", STYLE));
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{} Report</h1>\n", title));
        html.push_str(&format!(
            "<p>Generated: {}</p>\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));

        html.push_str("<table>\n<tr>");
        for column in dataset.columns() {
            html.push_str(&format!("<th>{}</th>", escape_html(column)));
        }
        html.push_str("</tr>\n");

        for row in dataset.rows() {
            html.push_str("<tr>");
            for column in dataset.columns() {
                let cell = format_cell(row.get(column));
                html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");

        html.push_str(&format!(
            "<div class=\"footer\"><p>{} rows</p></div>\n",
            dataset.len()
        ));
        html.push_str("</body>\n</html>\n");
        html
    }
}

impl Exporter for HtmlExporter {
    fn export(&self, dataset: &TabularDataset) -> Result<Vec<u8>> {
        Ok(self.render(dataset).into_bytes())
    }

    fn format_name(&self) -> &str {
        "html"
    }

    fn file_extension(&self) -> &str {
        "html"
    }

    fn mime_type(&self) -> &str {
        HTML_MIME_TYPE
    }
}

/// Escape text for element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn create_test_dataset() -> TabularDataset {
        TabularDataset::from_json(
            json!([
                { "product": "阿莫西林胶囊", "stock": 85000, "status": "normal" },
                { "product": "<script>", "stock": 0 }
            ]),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_render_table() {
        let exporter = HtmlExporter::new("Inventory")
            .with_generated_at(Local.with_ymd_and_hms(2024, 12, 5, 9, 30, 0).unwrap());
        let html = String::from_utf8(exporter.export(&create_test_dataset()).unwrap()).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(html.contains("<h1>Inventory Report</h1>"));
        assert!(html.contains("Generated: 2024-12-05 09:30:00"));
        assert!(html.contains("<tr><th>product</th><th>stock</th><th>status</th></tr>"));
        assert!(html.contains("<td>阿莫西林胶囊</td><td>85000</td><td>normal</td>"));
        assert!(html.contains("<td>&lt;script&gt;</td><td>0</td><td></td>"));
        assert!(html.contains("2 rows"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & \"b\" <c>"), "a &amp; &quot;b&quot; &lt;c&gt;");
        assert_eq!(escape_html("O'Neil"), "O&#39;Neil");
    }

    #[test]
    fn test_exporter_metadata() {
        let exporter = HtmlExporter::new("x");
        assert_eq!(exporter.format_name(), "html");
        assert_eq!(exporter.default_filename(), "export.html");
        assert!(exporter.mime_type().starts_with("text/html"));
    }
}
