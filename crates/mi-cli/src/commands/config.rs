//! Config command
//!
//! Inspect and create the mi-export configuration file.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

use mi_core::config::{Config, DEFAULT_CONFIG_PATH};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a configuration file with default values
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(path, json),
        ConfigCommand::Init { force } => init_config(&config_path(path), force),
        ConfigCommand::Validate => validate_config(&config_path(path)),
    }
}

fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn show_config(path: Option<&Path>, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config = Config::load_or_default(path).context("Failed to load configuration")?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let source = config_path(path);
    println!("{}", "Configuration:".bold().underline());
    if source.exists() {
        println!("{}", source.display().to_string().dimmed());
    } else {
        println!("{}", "(defaults, no configuration file)".dimmed());
    }
    println!();
    println!("{}", config.to_toml()?);

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    use colored::Colorize;

    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to replace it",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = format!("# mi-export configuration\n\n{}", Config::default().to_toml()?);
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}

fn validate_config(path: &Path) -> Result<()> {
    use colored::Colorize;

    if !path.exists() {
        bail!("Configuration not found at {}", path.display());
    }

    Config::load(path).with_context(|| format!("{} is invalid", path.display()))?;
    println!("{} {} is valid", "✓".green(), path.display());
    Ok(())
}
