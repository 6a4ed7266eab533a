//! Error handling for premiumize-dl
//!
//! This module defines the error types used throughout the crate and the
//! conversions from transport and (de)serialization errors.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PremiumizeError>;

/// Error types that can occur when talking to premiumize.me
#[derive(Error, Debug)]
pub enum PremiumizeError {
    /// The service answered an API call with an error status
    #[error("API call failed: {operation} - {message}")]
    Api { operation: String, message: String },

    /// A filter expression did not compile as a regular expression
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A listing matched zero items where a non-empty result is required
    #[error("No {what} matched the given pattern")]
    EmptyResult { what: String },

    /// Credentials or invocation arguments are unusable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The API did not answer within the retry budget
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Transport-level HTTP error
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PremiumizeError {
    /// Create a new API error
    pub fn api_error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        PremiumizeError::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a new empty-result error
    pub fn empty_result(what: impl Into<String>) -> Self {
        PremiumizeError::EmptyResult { what: what.into() }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        PremiumizeError::Config {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout(operation: impl Into<String>) -> Self {
        PremiumizeError::Timeout {
            operation: operation.into(),
        }
    }
}
