//! Error types for mi-export

use thiserror::Error;

/// Main error type for mi-export
#[derive(Debug, Error)]
pub enum ExportError {
    /// The remote endpoint could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The remote endpoint answered with a non-success status
    #[error("Export failed with status {status}: {message}")]
    ExportFailed { status: u16, message: String },

    /// The host could not materialize a saveable file from the payload
    #[error("Download unavailable: {0}")]
    DownloadUnavailable(String),

    /// A filename header was present but could not be parsed
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ExportError>,
    },
}

impl ExportError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ExportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for mi-export
pub type Result<T> = std::result::Result<T, ExportError>;
