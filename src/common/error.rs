//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    Parse { message: String },

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Failures of the fetch capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Http(u16),

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Http(status) => *status == 429 || *status >= 500,
        }
    }
}

/// Soft failure of a single extractor on a single URL.
///
/// Never aborts processing: dispatch moves on to the next matching extractor.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("unparseable response: {message}")]
    Parse { message: String },

    #[error("page is missing {what}")]
    MissingStructure { what: String },
}

impl ExtractionError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingStructure { what: what.into() }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            message: e.to_string(),
        }
    }
}

/// Idempotency store failures.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("idempotency store unavailable: {message}")]
    Unavailable { message: String },
}

/// Output sink failures.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to post message: {message}")]
    PostFailed { message: String },
}

/// Fatal failures of a processing unit, propagated to the trigger layer.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result type alias for extractor operations.
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;
