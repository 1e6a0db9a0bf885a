use thiserror::Error;

/// Main error type for relaybot
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Telegram error: {0}")]
    TransportError(String),

    #[error("Malformed inbound event: {0}")]
    MalformedEvent(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
