// src/error.rs

//! Unified error handling for the watch bot.

use std::fmt;

use thiserror::Error;

/// Result type alias for bot operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed responded with an empty body
    #[error("Feed returned an empty body")]
    EmptyFeed,

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Chat gateway failure
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Watch loop error
    #[error("Watch error for {context}: {message}")]
    Watch { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway(message.into())
    }

    /// Create a watch error with context.
    pub fn watch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Watch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error came from fetching or decoding the feed.
    ///
    /// Fetch failures are expected during server downtime and only warrant a
    /// retry notice; anything else gets logged to the error file.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::EmptyFeed | Self::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_cover_transport_and_decode() {
        assert!(AppError::EmptyFeed.is_fetch_failure());
        let json = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(AppError::Json(json).is_fetch_failure());
        assert!(!AppError::gateway("send failed").is_fetch_failure());
        assert!(!AppError::validation("bad grid").is_fetch_failure());
        assert!(!AppError::config("bad interval").is_fetch_failure());
        assert!(!AppError::watch("NA", "tick failed").is_fetch_failure());
    }
}
