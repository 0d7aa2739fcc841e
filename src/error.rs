//! Error types for directory operations.
//!
//! Every failure is returned to the caller as a typed [`DirectoryError`];
//! nothing is retried automatically and no write is ever partially
//! committed.

use crate::storage::StorageError;
use crate::validation::Violation;
use std::fmt;
use std::time::Duration;

/// Result alias used throughout the crate.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Country,
    Customer,
}

impl EntityKind {
    /// The storage collection holding records of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Country => "countries",
            EntityKind::Customer => "customers",
        }
    }

    fn from_collection(collection: &str) -> Option<Self> {
        match collection {
            "countries" => Some(EntityKind::Country),
            "customers" => Some(EntityKind::Customer),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Country => f.write_str("Country"),
            EntityKind::Customer => f.write_str("Customer"),
        }
    }
}

/// Main error type for directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The write was rejected by one or more validation rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// No record matches the given key.
    #[error("{entity_kind} not found with {field} '{value}'")]
    NotFound {
        entity_kind: EntityKind,
        field: String,
        value: String,
    },

    /// The store's unique constraint rejected the write after validation
    /// passed, i.e. a concurrent writer committed the same value first.
    #[error("Conflict on '{field}': value '{value}' is already taken")]
    Conflict { field: String, value: String },

    /// Malformed request parameters such as pagination or sort keys.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The caller cancelled a long-running query.
    #[error("Operation '{operation}' was cancelled")]
    Cancelled { operation: String },

    /// A long-running query exceeded its time bound.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The storage backend failed.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A stored record could not be (de)serialized.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DirectoryError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(
        entity_kind: EntityKind,
        field: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        Self::NotFound {
            entity_kind,
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn conflict(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether the caller can fix this by changing its input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DirectoryError::Validation(_)
                | DirectoryError::NotFound { .. }
                | DirectoryError::Conflict { .. }
                | DirectoryError::InvalidArgument { .. }
        )
    }

    /// Violations carried by a validation failure, empty for other errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            DirectoryError::Validation(errors) => errors.violations(),
            _ => &[],
        }
    }

    /// Whether this error rejects `field`, either as a violation or as a conflict.
    pub fn concerns_field(&self, field: &str) -> bool {
        match self {
            DirectoryError::Validation(errors) => errors.for_field(field).next().is_some(),
            DirectoryError::Conflict { field: f, .. } => f == field,
            _ => false,
        }
    }
}

impl From<StorageError> for DirectoryError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::UniqueViolation {
                attribute, value, ..
            } => DirectoryError::Conflict {
                field: attribute,
                value,
            },
            StorageError::ResourceNotFound { collection, id } => {
                match EntityKind::from_collection(&collection) {
                    Some(kind) => DirectoryError::not_found(kind, "id", id),
                    None => DirectoryError::storage(format!(
                        "record not found: {}/{}",
                        collection, id
                    )),
                }
            }
            StorageError::Timeout {
                operation,
                duration,
            } => DirectoryError::Timeout {
                operation,
                duration,
            },
            other => DirectoryError::storage(other.to_string()),
        }
    }
}

/// The ordered list of violations that rejected one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Violations reported against one field, in rule order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }

    /// Fields with at least one violation, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for violation in &self.violations {
            if !fields.contains(&violation.field.as_str()) {
                fields.push(&violation.field);
            }
        }
        fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
