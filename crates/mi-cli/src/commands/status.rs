//! Status command
//!
//! Show whether the export service is up and what it supports.

use anyhow::{Context, Result};
use clap::Args;

use mi_core::config::Config;
use mi_remote::ExportClient;

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let client = ExportClient::new(config.remote.clone())?;
    let status = client
        .status()
        .await
        .with_context(|| format!("Export service at {} is unavailable", client.config().base_url))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Export service:".bold().underline());
    println!("  URL:      {}", client.config().base_url);
    println!("  Status:   {}", status.status.green());
    println!("  Formats:  {}", status.supported_formats.join(", "));
    println!("  Exports:  {}", status.total_exports);
    if let Some(last_check) = &status.last_check {
        println!("  Checked:  {}", last_check.dimmed());
    }

    Ok(())
}
