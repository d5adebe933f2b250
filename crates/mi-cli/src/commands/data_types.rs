//! Data types command
//!
//! List the data types the export service can render.

use anyhow::{Context, Result};
use clap::Args;

use mi_core::config::Config;
use mi_remote::ExportClient;

/// Arguments for the data-types command
#[derive(Debug, Args)]
pub struct DataTypesArgs {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the data-types command
pub async fn execute(args: DataTypesArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let client = ExportClient::new(config.remote.clone())?;
    let types = client.data_types().await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&types).context("Failed to encode data types")?
        );
        return Ok(());
    }

    if types.is_empty() {
        eprintln!(
            "{} No export options available from {}",
            "⚠".yellow(),
            client.config().base_url
        );
        return Ok(());
    }

    println!("{}", "Exportable data types:".bold().underline());
    for info in &types {
        match &info.description {
            Some(description) => println!(
                "  {:<14} {} {}",
                info.key.cyan(),
                info.display_name(),
                format!("({})", description).dimmed()
            ),
            None => println!("  {:<14} {}", info.key.cyan(), info.display_name()),
        }
    }

    Ok(())
}
