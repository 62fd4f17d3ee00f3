// src/error.rs

//! Unified error handling for the scanner.

use std::fmt;

use thiserror::Error;

/// Result type alias for scanner operations.
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

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// A raw-pattern keyword did not compile
    #[error("Invalid pattern '{spec}': {message}")]
    Pattern { spec: String, message: String },

    /// The crawl seed cannot be used as a starting point
    #[error("Invalid seed '{seed}': {message}")]
    InvalidSeed { seed: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fetching a page failed
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },
}

impl AppError {
    /// Create a pattern compilation error.
    pub fn pattern(spec: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Pattern {
            spec: spec.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid seed error.
    pub fn invalid_seed(seed: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::InvalidSeed {
            seed: seed.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
