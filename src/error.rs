// src/error.rs

//! Unified error handling for the LocalHub data layer.

use std::fmt;

use thiserror::Error;

use crate::models::Category;

/// Result type alias for data layer operations.
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

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("{category} item not found: {id}")]
    NotFound { category: Category, id: String },

    /// Input payload does not fit the category's draft shape
    #[error("Invalid {category} payload: {message}")]
    InvalidPayload { category: Category, message: String },

    /// Category tag is not one of the known content categories
    #[error("Unknown item type: {0}")]
    UnknownCategory(String),

    /// Patch belongs to a different category than the target collection
    #[error("Patch for {found} cannot be applied to {expected}")]
    CategoryMismatch { expected: Category, found: Category },

    /// Remote document service answered with an error status
    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// External feed could not be fetched or decoded
    #[error("Feed error: {0}")]
    Feed(String),
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

    /// Create a not-found error for a record id.
    pub fn not_found(category: Category, id: impl Into<String>) -> Self {
        Self::NotFound {
            category,
            id: id.into(),
        }
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(category: Category, message: impl fmt::Display) -> Self {
        Self::InvalidPayload {
            category,
            message: message.to_string(),
        }
    }

    /// Create a remote service error from a status code and response body.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Create a feed error.
    pub fn feed(message: impl fmt::Display) -> Self {
        Self::Feed(message.to_string())
    }

    /// Whether this error means the referenced record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
