//! Data layer error types
//!
//! Every data service and repository reports failures with [`DataError`], so
//! callers see one taxonomy regardless of entity type or storage engine.

use thiserror::Error;

/// Error type for data service and repository operations
#[derive(Debug, Error)]
pub enum DataError {
    /// A caller-supplied value violates a documented precondition
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        argument: String,
        message: String,
    },

    /// A required object argument was absent
    #[error("Required argument '{argument}' was not supplied")]
    NullReference {
        argument: String,
    },

    /// A single-result lookup matched no records
    #[error("No {entity_type} entity found for {criteria}")]
    NotFound {
        entity_type: String,
        criteria: String,
    },

    /// A single-result lookup matched more than one record
    #[error("Multiple {entity_type} entities found for {criteria}")]
    AmbiguousResult {
        entity_type: String,
        criteria: String,
    },

    /// The underlying store failed
    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DataError {
    /// Creates an InvalidArgument error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        DataError::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Creates a NullReference error
    pub fn null_reference(argument: impl Into<String>) -> Self {
        DataError::NullReference {
            argument: argument.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, criteria: impl std::fmt::Display) -> Self {
        DataError::NotFound {
            entity_type: entity_type.into(),
            criteria: criteria.to_string(),
        }
    }

    /// Creates an AmbiguousResult error
    pub fn ambiguous(entity_type: impl Into<String>, criteria: impl std::fmt::Display) -> Self {
        DataError::AmbiguousResult {
            entity_type: entity_type.into(),
            criteria: criteria.to_string(),
        }
    }

    /// Creates a Storage error that wraps the underlying cause
    pub fn storage<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DataError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a Storage error with no underlying cause
    pub fn storage_message(message: impl Into<String>) -> Self {
        DataError::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DataError::InvalidArgument { .. })
    }

    pub fn is_null_reference(&self) -> bool {
        matches!(self, DataError::NullReference { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound { .. })
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, DataError::AmbiguousResult { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, DataError::Storage { .. })
    }
}
