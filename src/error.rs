//! Error types for the themis evaluation service
//!
//! Structured error definitions via thiserror, with anyhow used only at the
//! binary boundary for error propagation.

use thiserror::Error;

/// Main error type for themis operations
#[derive(Error, Debug)]
pub enum ThemisError {
    /// Malformed or missing request fields (HTTP 422)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unrecognized sub-metric key (configuration bug, HTTP 500)
    #[error("Unknown sub-metric: {0}")]
    InvalidSubMetric(String),

    /// A main metric ended up with zero sub-metric scores (configuration bug, HTTP 500)
    #[error("Metric '{0}' has no sub-metrics defined")]
    EmptyMetricDefinition(String),

    /// A sub-metric score fell outside the documented 1-5 range
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// LLM API request failed
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ThemisError {
    /// Stable machine-readable label for error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            ThemisError::Validation(_) => "validation_error",
            ThemisError::InvalidSubMetric(_) => "invalid_submetric",
            ThemisError::EmptyMetricDefinition(_) => "empty_metric_definition",
            ThemisError::InvalidScore(_) => "invalid_score",
            ThemisError::LlmApi(_) => "llm_api_error",
            ThemisError::Embedding(_) => "embedding_error",
            ThemisError::Config(_) => "config_error",
            _ => "internal_error",
        }
    }
}

/// Result type alias for themis operations
pub type Result<T> = std::result::Result<T, ThemisError>;

/// Convert anyhow::Error to ThemisError
impl From<anyhow::Error> for ThemisError {
    fn from(err: anyhow::Error) -> Self {
        ThemisError::Other(err.to_string())
    }
}
