//! Failures reported by storage backends.
//!
//! A backend knows collections, ids and index attributes, nothing about
//! countries or customers. The registries turn these into
//! [`DirectoryError`](crate::DirectoryError) values.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No record with this id in the collection.
    ResourceNotFound { collection: String, id: u64 },

    /// The write would give a unique index two holders of `value`.
    /// Nothing was written.
    UniqueViolation {
        collection: String,
        attribute: String,
        value: String,
    },

    /// The record is not storable, e.g. it is not a JSON object.
    InvalidData {
        message: String,
        cause: Option<String>,
    },

    /// The backend gave up on an operation.
    Timeout { operation: String, duration: Duration },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ResourceNotFound { collection, id } => {
                write!(f, "Record not found: {}/{}", collection, id)
            }
            StorageError::UniqueViolation {
                collection,
                attribute,
                value,
            } => write!(
                f,
                "Unique index violated on {}.{}: value '{}' already exists",
                collection, attribute, value
            ),
            StorageError::InvalidData {
                message,
                cause: Some(cause),
            } => write!(f, "Invalid data: {} ({})", message, cause),
            StorageError::InvalidData { message, cause: None } => {
                write!(f, "Invalid data: {}", message)
            }
            StorageError::Timeout {
                operation,
                duration,
            } => write!(f, "Storage {} timed out after {:?}", operation, duration),
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    pub fn resource_not_found(collection: impl Into<String>, id: u64) -> Self {
        Self::ResourceNotFound {
            collection: collection.into(),
            id,
        }
    }

    pub fn unique_violation(
        collection: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::UniqueViolation {
            collection: collection.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
            cause: None,
        }
    }

    pub fn invalid_data_with_cause(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ResourceNotFound { .. })
    }

    /// Whether a unique index rejected the write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::UniqueViolation { .. })
    }

    /// Whether the same request could succeed later.
    pub fn is_temporary(&self) -> bool {
        matches!(self, StorageError::Timeout { .. })
    }
}
