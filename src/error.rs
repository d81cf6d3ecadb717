use thiserror::Error;

/// Errors that stop a load test from starting or from producing its report.
///
/// Failed checks are not errors; they are counted in the run metrics.
#[derive(Debug, Error)]
pub enum LoadTestError {
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Target is not healthy: {0}")]
    Unhealthy(String),

    #[error("Latency histogram error: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Summary serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<figment::Error> for LoadTestError {
    fn from(error: figment::Error) -> Self {
        LoadTestError::Config(Box::new(error))
    }
}

pub type Result<T> = std::result::Result<T, LoadTestError>;

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Short label used as a metrics key
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout => "timeout",
            TransportError::Connect(_) => "connect",
            TransportError::Other(_) => "other",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}
