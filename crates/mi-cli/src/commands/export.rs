//! Export command
//!
//! Download a server-rendered export from the export service.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use mi_core::config::Config;
use mi_core::{ExportRequest, FilterValue, Filters, RemoteFormat};
use mi_remote::ExportClient;

use super::DownloadArgs;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV file
    Csv,
    /// HTML report
    Html,
}

impl From<ExportFormat> for RemoteFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => RemoteFormat::Csv,
            ExportFormat::Html => RemoteFormat::Html,
        }
    }
}

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Data type to export (sales, competitors, customers, inventory, medical, ...)
    pub data_type: String,

    /// Export format (default: from configuration)
    #[arg(long, short, value_enum)]
    pub format: Option<ExportFormat>,

    /// Filter as KEY=VALUE; use KEY=FROM..TO for a range
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, FilterValue)>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub download: DownloadArgs,
}

/// Execute the export command
pub async fn execute(args: ExportArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let format = args
        .format
        .map(RemoteFormat::from)
        .unwrap_or(config.export.default_format);
    let filters: Filters = args.filters.into_iter().collect();
    let request = ExportRequest::new(args.data_type.as_str(), format).with_filters(filters);

    let trigger = args.download.trigger(config);
    let client = ExportClient::new(config.remote.clone())?;

    if !args.json {
        eprintln!(
            "Requesting {} export of {} from {}...",
            format.to_string().cyan(),
            request.data_type.to_string().yellow(),
            client.config().base_url
        );
    }

    let result = client.export_data(&request, &trigger).await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to encode result")?
        );
    }

    match (result.success, result.filename, result.error) {
        (true, Some(filename), _) => {
            if !args.json {
                eprintln!(
                    "{} Saved into {} (suggested name: {})",
                    "✓".green(),
                    trigger.dir().display(),
                    filename
                );
            }
            Ok(())
        }
        (_, _, error) => bail!(error.unwrap_or_else(|| "Export failed".to_string())),
    }
}

/// Parse `KEY=VALUE` into a filter entry
fn parse_filter(s: &str) -> std::result::Result<(String, FilterValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("filter key is empty in '{}'", s));
    }
    let value = value
        .parse::<FilterValue>()
        .map_err(|e| e.to_string())?;
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mi_core::Scalar;

    #[test]
    fn test_export_format_values() {
        assert!(ExportFormat::from_str("csv", true).is_ok());
        assert!(ExportFormat::from_str("html", true).is_ok());
        assert!(ExportFormat::from_str("pdf", true).is_err());
    }

    #[test]
    fn test_parse_filter() {
        let (key, value) = parse_filter("region=华东").unwrap();
        assert_eq!(key, "region");
        assert_eq!(value, FilterValue::Scalar(Scalar::Text("华东".to_string())));

        let (_, value) = parse_filter("date=2024-12-01..2024-12-31").unwrap();
        assert!(matches!(value, FilterValue::Range { .. }));

        assert!(parse_filter("region").is_err());
        assert!(parse_filter("=x").is_err());
    }
}
