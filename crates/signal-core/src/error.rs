//! Error types for the signal alerting system.

use thiserror::Error;

/// Top-level signal system error.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Candle source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("API error (code {code}): {message}")]
    Api { code: i64, message: String },

    #[error("Rate limited by the exchange")]
    RateLimited,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

impl DataError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Parse failures and exchange rejections are permanent for the current
    /// request; connection problems, timeouts, throttling and server errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::ConnectionError(_) | DataError::Timeout(_) | DataError::RateLimited => true,
            DataError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Signal engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Series not tracked: {0}")]
    UnknownKey(String),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Policy not found: {0}")]
    PolicyNotFound(String),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// Result type alias for signal system operations.
pub type SignalResult<T> = Result<T, SignalError>;
