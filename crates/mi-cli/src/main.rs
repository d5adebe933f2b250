//! mi-export - Dashboard data export CLI
//!
//! Saves dashboard data as CSV, JSON or HTML files, either rendered by the
//! remote export service or formatted locally from data already on hand.
//!
//! ## Quick Start
//!
//! ```bash
//! # See what the service can export
//! mi-export data-types
//!
//! # Download a server-rendered export
//! mi-export export sales --format csv --filter region=华东
//!
//! # Export rows you already have, named after the page and today's date
//! mi-export local rows.json --page sales --columns month,amount
//! ```

mod commands;

#[tokio::main]
async fn main() {
    if let Err(err) = commands::run().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
