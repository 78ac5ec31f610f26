use thiserror::Error;

/// Errors that can occur while talking to the job scraping API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("Failed to reach the API: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The API answered with a non-success status code
    #[error("API returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The requested job, company or session does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    DecodeError(#[from] serde_json::Error),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Preference file could not be read or written
    #[error("Preference storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// The operation was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,
}
