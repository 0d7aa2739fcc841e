//! Storage abstraction layer for directory records.
//!
//! The `StorageProvider` trait defines the durable, key-indexed store the
//! registries persist into. It is deliberately record-agnostic: records are
//! JSON objects grouped into named collections, identified by a store-assigned
//! numeric id.
//!
//! # Architecture
//!
//! The storage layer is responsible for:
//! - Insert/update/get/delete of JSON records
//! - Assigning ids in insertion order
//! - Enforcing declared unique indexes atomically with each write
//! - Filtered, ordered, paged scans and grouped counts
//!
//! The storage layer is NOT responsible for:
//! - Field-level validation (lengths, patterns, enums)
//! - Cross-collection references (phone dial code → country)
//! - Timestamps or any other record metadata
//!
//! A unique index is the final authority on uniqueness. The registries check
//! uniqueness before writing so they can report friendly violations, but two
//! concurrent writers can both pass that check; only the index rejects the
//! second one.
//!
//! # Example Usage
//!
//! ```rust
//! use phone_directory::storage::{IndexDefinition, InMemoryStorage, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! storage
//!     .ensure_index("countries", IndexDefinition::unique("isd_code"))
//!     .await?;
//!
//! let (key, stored) = storage
//!     .insert("countries", json!({"name": "Egypt", "isd_code": "20"}))
//!     .await?;
//! assert_eq!(stored["id"], json!(key.id()));
//!
//! // A second record with the same dial code is rejected by the index.
//! let duplicate = storage
//!     .insert("countries", json!({"name": "Elsewhere", "isd_code": "20"}))
//!     .await;
//! assert!(duplicate.is_err());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::{InMemoryStorage, InMemoryStorageStats};

use crate::model::SortDirection;
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Identifies one record: the collection it lives in and its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    collection: String,
    id: u64,
}

impl StorageKey {
    /// Create a new storage key.
    pub fn new(collection: impl Into<String>, id: u64) -> Self {
        Self {
            collection: collection.into(),
            id,
        }
    }

    /// Get the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Get the record id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Declares an index over one top-level attribute of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    attribute: String,
    unique: bool,
}

impl IndexDefinition {
    /// An index whose values may appear on at most one record.
    pub fn unique(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            unique: true,
        }
    }

    /// A lookup/grouping index with no uniqueness constraint.
    pub fn non_unique(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            unique: false,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

/// Predicate applied to records during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFilter {
    /// Every record matches.
    All,
    /// The attribute contains `value`, ignoring case.
    ContainsIgnoreCase { attribute: String, value: String },
    /// The attribute equals `value`, ignoring case.
    EqualsIgnoreCase { attribute: String, value: String },
}

impl ScanFilter {
    pub fn contains_ignore_case(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ContainsIgnoreCase {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn equals_ignore_case(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::EqualsIgnoreCase {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Check whether a record satisfies the filter.
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            ScanFilter::All => true,
            ScanFilter::ContainsIgnoreCase { attribute, value } => {
                attribute_value(record, attribute)
                    .map(|v| v.to_lowercase().contains(&value.to_lowercase()))
                    .unwrap_or(false)
            }
            ScanFilter::EqualsIgnoreCase { attribute, value } => {
                attribute_value(record, attribute)
                    .map(|v| v.to_lowercase() == value.to_lowercase())
                    .unwrap_or(false)
            }
        }
    }
}

/// Ordering applied to the records of a scan before paging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// Ascending id, i.e. the order records were inserted.
    #[default]
    Insertion,
    /// String order on an attribute; ties fall back to insertion order and
    /// records without the attribute sort first when ascending.
    Attribute {
        attribute: String,
        direction: SortDirection,
    },
}

/// One page of scan results together with the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage {
    pub items: Vec<(StorageKey, Value)>,
    pub total: usize,
}

impl ScanPage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Read a top-level attribute as an index/filter value.
///
/// Strings are returned as-is, numbers and booleans in their JSON text form.
/// Null, absent, empty-string and structured values yield `None` and are never indexed.
pub fn attribute_value(record: &Value, attribute: &str) -> Option<String> {
    match record.get(attribute)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Core trait for the durable store behind the registries.
///
/// # Design Principles
///
/// - **Store-assigned ids**: `insert` allocates a strictly increasing id and
///   writes it into the record's `id` field.
/// - **Atomic constraints**: every unique index declared through
///   [`ensure_index`](Self::ensure_index) is checked inside the same critical
///   section as the write it guards.
/// - **Committed reads only**: reads never observe a write that failed.
/// - **Async first**: all operations return futures.
pub trait StorageProvider: Send + Sync {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + Into<StorageError> + 'static;

    /// Declare an index on a collection. Declaring the same index twice is a no-op.
    ///
    /// Declaring a unique index over existing duplicate values fails with a
    /// unique violation and leaves the index undeclared.
    fn ensure_index(
        &self,
        collection: &str,
        index: IndexDefinition,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Insert a new record and return its key and the data as stored.
    ///
    /// # Behavior
    /// - `data` must be a JSON object; any client-supplied `id` is overwritten
    /// - Fails with a unique violation if any unique index would be duplicated
    fn insert(
        &self,
        collection: &str,
        data: Value,
    ) -> impl Future<Output = Result<(StorageKey, Value), Self::Error>> + Send;

    /// Replace an existing record.
    ///
    /// # Behavior
    /// - Fails with not-found if no record exists at `key`
    /// - Unique indexes are checked against every record except this one
    fn update(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Retrieve a record by key.
    fn get(
        &self,
        key: StorageKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Delete a record by key.
    ///
    /// # Returns
    /// `true` if the record was deleted, `false` if it didn't exist.
    fn delete(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Find records whose attribute equals `value` exactly.
    ///
    /// Uses the attribute's index when one is declared. Results are in insertion order.
    fn find_by_attribute(
        &self,
        collection: &str,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    /// Filtered, ordered, paged scan.
    ///
    /// # Behavior
    /// - `total` counts every record matching `filter`, independent of paging
    /// - If `offset` exceeds the match count, `items` is empty
    /// - If `limit` is 0, `items` is empty
    fn scan(
        &self,
        collection: &str,
        filter: &ScanFilter,
        order: &ScanOrder,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<ScanPage, Self::Error>> + Send;

    /// Count records grouped by an attribute's value.
    ///
    /// Records without the attribute are grouped under `None`. The order of
    /// groups is unspecified.
    fn group_count(
        &self,
        collection: &str,
        attribute: &str,
    ) -> impl Future<Output = Result<Vec<(Option<String>, usize)>, Self::Error>> + Send;

    /// Count all records in a collection.
    fn count(&self, collection: &str) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// Remove every record. Declared indexes are kept, emptied.
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
