//! Error types for Chestkeeper Core
//!
//! Every store implementation reports failures through [`CoreError`]. We use
//! `thiserror` for the Display/Error implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for record and store operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// SQLite backend errors
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Slot payload (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored identity could not be parsed back into a UUID
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Slot index outside the fixed record capacity
    #[error("Slot {index} is out of range (capacity {capacity})")]
    SlotOutOfRange {
        /// Requested slot index
        index: usize,
        /// Fixed record capacity
        capacity: usize,
    },

    /// Any other backend failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl CoreError {
    /// Build a backend error from anything displayable
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_out_of_range_message() {
        let err = CoreError::SlotOutOfRange {
            index: 60,
            capacity: 54,
        };
        assert_eq!(err.to_string(), "Slot 60 is out of range (capacity 54)");
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: CoreError = parse.unwrap_err().into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
