//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod data_types;
pub mod export;
pub mod local;
pub mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mi_core::config::Config;
use mi_storage::DirectoryDownload;
use std::path::{Path, PathBuf};
use tracing::debug;

/// mi-export - Dashboard data export toolkit
#[derive(Debug, Parser)]
#[command(name = "mi-export")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Export service base URL (overrides the configuration file)
    #[arg(long, global = true, env = "MI_EXPORT_BASE_URL")]
    pub base_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download a server-rendered export
    Export(export::ExportArgs),

    /// List the data types the export service offers
    DataTypes(data_types::DataTypesArgs),

    /// Show export service status
    Status(status::StatusArgs),

    /// Export local JSON rows without contacting the service
    Local(local::LocalArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Where downloads go, shared by the commands that save files
#[derive(Debug, clap::Args)]
pub struct DownloadArgs {
    /// Directory to save into (default: configured or user download directory)
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Replace existing files instead of numbering new ones
    #[arg(long)]
    pub overwrite: bool,
}

impl DownloadArgs {
    /// Build the download trigger, letting flags win over configuration
    pub fn trigger(&self, config: &Config) -> DirectoryDownload {
        let mut download = config.download.clone();
        if let Some(dir) = &self.output_dir {
            download.output_dir = Some(dir.clone());
        }
        if self.overwrite {
            download.overwrite = true;
        }
        DirectoryDownload::from_config(&download)
    }
}

/// Run the CLI application
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let path = cli.config.as_deref();
    let base_url = cli.base_url.as_deref();

    // Dispatch to command handler; config commands manage the file itself and
    // must work when it is broken
    match cli.command {
        Commands::Export(args) => export::execute(args, &load_config(path, base_url)?).await,
        Commands::DataTypes(args) => {
            data_types::execute(args, &load_config(path, base_url)?).await
        }
        Commands::Status(args) => status::execute(args, &load_config(path, base_url)?).await,
        Commands::Local(args) => local::execute(args, &load_config(path, base_url)?),
        Commands::Config(cmd) => config::execute(cmd, path),
    }
}

/// Load configuration and apply command-line overrides
fn load_config(path: Option<&Path>, base_url: Option<&str>) -> Result<Config> {
    let mut config = Config::load_or_default(path).context("Failed to load configuration")?;

    if let Some(base_url) = base_url {
        config.remote.base_url = base_url.to_string();
        config
            .validate()
            .context("Invalid --base-url")?;
    }

    debug!("Export service: {}", config.remote.base_url);
    Ok(config)
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_text() {
        let cmd = Cli::command();
        assert!(cmd.get_about().is_some());
    }

    #[test]
    fn test_download_args_override_config() {
        let cli = Cli::parse_from([
            "mi-export",
            "export",
            "sales",
            "--output-dir",
            "/tmp/exports",
            "--overwrite",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };

        let trigger = args.download.trigger(&Config::default());
        assert_eq!(trigger.dir(), std::path::Path::new("/tmp/exports"));
    }
}
