//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for OpsPulse
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum OpsPulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Record source error: {0}")]
    Source(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for OpsPulse operations
pub type Result<T> = std::result::Result<T, OpsPulseError>;
