//! Error types for Chestkeeper Admin

use chestkeeper_core::CoreError;
use thiserror::Error;

use crate::commands::Capability;

/// Admin error type
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("No record found for: {0}")]
    TargetNotFound(String),

    #[error("Missing capability: {0}")]
    NotAuthorized(Capability),

    #[error("Caller must be an interactive player")]
    CallerMustBeInteractive,

    #[error("Store error: {0}")]
    Store(#[from] CoreError),

    #[error("Failed to delete record for {name}: {source}")]
    DeleteFailed {
        name: String,
        #[source]
        source: CoreError,
    },

    #[error("Presentation error: {0}")]
    Presentation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Runtime unavailable: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        AdminError::Serialization(e.to_string())
    }
}

/// Result type for admin operations
pub type Result<T> = std::result::Result<T, AdminError>;
