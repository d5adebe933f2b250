//! Local command
//!
//! Export JSON rows that are already on hand, without the export service.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};

use mi_core::config::Config;
use mi_core::export::LocalExporter;
use mi_core::TabularDataset;

use super::DownloadArgs;

/// Local export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LocalFormat {
    /// CSV with a UTF-8 byte-order mark
    #[default]
    Csv,
    /// Pretty-printed JSON
    Json,
    /// Standalone HTML table report
    Html,
}

/// Arguments for the local command
#[derive(Debug, Args)]
pub struct LocalArgs {
    /// JSON file with an array of row objects ("-" reads stdin)
    pub input: PathBuf,

    /// Output format
    #[arg(long, short, value_enum, default_value = "csv")]
    pub format: LocalFormat,

    /// Column order, comma separated (default: order of first appearance)
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Name the file <PAGE>_<YYYY-MM-DD>.csv after a dashboard page
    #[arg(long)]
    pub page: Option<String>,

    /// Date used with --page instead of today (YYYY-MM-DD)
    #[arg(long, requires = "page")]
    pub date: Option<NaiveDate>,

    /// File name to save as
    #[arg(long, conflicts_with = "page")]
    pub filename: Option<String>,

    /// Report title for HTML output
    #[arg(long, default_value = "Export")]
    pub title: String,

    #[command(flatten)]
    pub download: DownloadArgs,
}

/// Execute the local command
pub fn execute(args: LocalArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let value = read_input(&args.input)?;
    let trigger = args.download.trigger(config);
    let exporter =
        LocalExporter::new(&trigger).with_pretty_json(config.export.pretty_json);
    let filename = args.filename.as_deref();

    let saved = match (args.format, &args.page) {
        (LocalFormat::Csv, Some(page)) => {
            let dataset = TabularDataset::from_json(value, args.columns)?;
            let rows = dataset.rows().to_vec();
            match args.date {
                Some(date) => exporter.export_page_data_on(page, date, rows, dataset.columns())?,
                None => exporter.export_page_data(page, rows, dataset.columns())?,
            }
        }
        (_, Some(_)) => bail!("--page always produces CSV; drop --format or use --filename"),
        (LocalFormat::Csv, None) => {
            let dataset = TabularDataset::from_json(value, args.columns)?;
            exporter.export_csv(&dataset, filename)?
        }
        (LocalFormat::Html, None) => {
            let dataset = TabularDataset::from_json(value, args.columns)?;
            exporter.export_html(&dataset, &args.title, filename)?
        }
        (LocalFormat::Json, None) => exporter.export_json(&value, filename)?,
    };

    eprintln!(
        "{} Saved into {} (suggested name: {})",
        "✓".green(),
        trigger.dir().display(),
        saved
    );
    Ok(())
}

fn read_input(path: &Path) -> Result<serde_json::Value> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content).context("Input is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(input: PathBuf, out: &TempDir) -> LocalArgs {
        LocalArgs {
            input,
            format: LocalFormat::Csv,
            columns: None,
            page: None,
            date: None,
            filename: None,
            title: "Export".to_string(),
            download: DownloadArgs {
                output_dir: Some(out.path().to_path_buf()),
                overwrite: false,
            },
        }
    }

    fn write_rows(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("rows.json");
        fs::write(
            &path,
            r#"[{"month": "2024-03", "amount": 5200}, {"month": "2024-04", "amount": 0}]"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_local_page_export() {
        let input_dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut args = args(write_rows(&input_dir), &out);
        args.page = Some("sales".to_string());
        args.date = NaiveDate::from_ymd_opt(2024, 3, 15);

        execute(args, &Config::default()).unwrap();

        let csv = fs::read_to_string(out.path().join("sales_2024-03-15.csv")).unwrap();
        assert_eq!(csv, "\u{feff}month,amount\n2024-03,5200\n2024-04,0\n");
    }

    #[test]
    fn test_local_json_export() {
        let input_dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut args = args(write_rows(&input_dir), &out);
        args.format = LocalFormat::Json;

        execute(args, &Config::default()).unwrap();

        let json = fs::read_to_string(out.path().join("export.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["amount"], 0);
    }

    #[test]
    fn test_page_requires_csv() {
        let input_dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut args = args(write_rows(&input_dir), &out);
        args.page = Some("sales".to_string());
        args.format = LocalFormat::Html;

        assert!(execute(args, &Config::default()).is_err());
    }

    #[test]
    fn test_invalid_input() {
        let input_dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let path = input_dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        assert!(execute(args(path, &out), &Config::default()).is_err());
    }
}
