//! In-memory storage implementation for directory records.
//!
//! This module provides a thread-safe in-memory implementation of the
//! `StorageProvider` trait. It's designed for tests, development, and
//! embedding scenarios where persistence is not required, but it honours the
//! same contract a database backend would: unique indexes are enforced inside
//! the write critical section and readers only see committed records.
//!
//! # Features
//!
//! * Thread-safe concurrent access with async RwLock
//! * Store-assigned, strictly increasing ids (insertion order)
//! * Unique and non-unique indexes over top-level attributes
//! * Grouped counts served from an index when one exists
//!
//! # Performance Characteristics
//!
//! * INSERT/UPDATE/DELETE: O(log n) per declared index
//! * GET: O(log n)
//! * FIND_BY_ATTRIBUTE: O(log n) when indexed, O(n) otherwise
//! * SCAN: O(n) over the collection, plus a sort when ordered by attribute
//! * GROUP_COUNT: O(distinct values) when indexed, O(n) otherwise
//!
//! # Example Usage
//!
//! ```rust
//! use phone_directory::storage::{InMemoryStorage, ScanFilter, ScanOrder, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let (key, _) = storage
//!     .insert("customers", json!({"name": "Walid", "country_code": "EG"}))
//!     .await?;
//!
//! let page = storage
//!     .scan("customers", &ScanFilter::All, &ScanOrder::Insertion, 0, 10)
//!     .await?;
//! assert_eq!(page.total, 1);
//!
//! assert!(storage.delete(key).await?);
//! # Ok(())
//! # }
//! ```

use crate::model::SortDirection;
use crate::storage::{
    IndexDefinition, ScanFilter, ScanOrder, ScanPage, StorageError, StorageKey, StorageProvider,
    attribute_value,
};
use log::{debug, trace};
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Records examined between cooperative yields in an unindexed group count.
const SCAN_CHUNK: usize = 1024;

#[derive(Debug, Default)]
struct Index {
    unique: bool,
    entries: BTreeMap<String, BTreeSet<u64>>,
}

impl Index {
    fn insert(&mut self, value: String, id: u64) {
        self.entries.entry(value).or_default().insert(id);
    }

    fn remove(&mut self, value: &str, id: u64) {
        if let Some(ids) = self.entries.get_mut(value) {
            ids.remove(&id);
            if ids.is_empty() {
                self.entries.remove(value);
            }
        }
    }
}

#[derive(Debug, Default)]
struct Collection {
    last_id: u64,
    records: BTreeMap<u64, Value>,
    indexes: HashMap<String, Index>,
}

impl Collection {
    /// Reject `data` if it would duplicate a unique index entry held by another record.
    fn check_unique(
        &self,
        collection: &str,
        data: &Value,
        exclude_id: Option<u64>,
    ) -> Result<(), StorageError> {
        for (attribute, index) in self.indexes.iter().filter(|(_, index)| index.unique) {
            let Some(value) = attribute_value(data, attribute) else {
                continue;
            };
            if let Some(holders) = index.entries.get(&value) {
                if holders.iter().any(|id| Some(*id) != exclude_id) {
                    return Err(StorageError::unique_violation(collection, attribute, value));
                }
            }
        }
        Ok(())
    }

    fn index_record(&mut self, id: u64, data: &Value) {
        for (attribute, index) in self.indexes.iter_mut() {
            if let Some(value) = attribute_value(data, attribute) {
                index.insert(value, id);
            }
        }
    }

    fn unindex_record(&mut self, id: u64, data: &Value) {
        for (attribute, index) in self.indexes.iter_mut() {
            if let Some(value) = attribute_value(data, attribute) {
                index.remove(&value, id);
            }
        }
    }
}

/// Thread-safe in-memory storage implementation.
///
/// Layout: `collection` → ids → record, with per-attribute indexes alongside.
/// Every mutating operation holds the write lock for its entire
/// check-and-mutate step, so writes are serializable.
#[derive(Clone)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage instance.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get storage statistics for debugging and monitoring.
    pub async fn stats(&self) -> InMemoryStorageStats {
        let data_guard = self.data.read().await;
        let mut stats = InMemoryStorageStats {
            collection_count: data_guard.len(),
            total_records: 0,
            index_count: 0,
        };

        for collection in data_guard.values() {
            stats.total_records += collection.records.len();
            stats.index_count += collection.indexes.len();
        }

        stats
    }

    /// Get the names of all collections currently in storage.
    pub async fn list_collections(&self) -> Vec<String> {
        let data_guard = self.data.read().await;
        let mut names: Vec<String> = data_guard.keys().cloned().collect();
        names.sort();
        names
    }

    fn as_object(data: &Value) -> Result<(), StorageError> {
        if data.is_object() {
            Ok(())
        } else {
            Err(StorageError::invalid_data_with_cause(
                "record must be a JSON object",
                format!("got {}", json_kind(data)),
            ))
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Order two attribute values: absent first, numbers numerically, everything else as text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn present(v: Option<&Value>) -> Option<&Value> {
        v.filter(|v| !v.is_null())
    }
    match (present(a), present(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

impl StorageProvider for InMemoryStorage {
    type Error = StorageError;

    async fn ensure_index(
        &self,
        collection: &str,
        index: IndexDefinition,
    ) -> Result<(), Self::Error> {
        let mut data_guard = self.data.write().await;
        let coll = data_guard.entry(collection.to_string()).or_default();

        if let Some(existing) = coll.indexes.get(index.attribute()) {
            if existing.unique == index.is_unique() {
                return Ok(());
            }
            return Err(StorageError::invalid_data(format!(
                "index on {}.{} already declared with different uniqueness",
                collection,
                index.attribute()
            )));
        }

        let mut built = Index {
            unique: index.is_unique(),
            entries: BTreeMap::new(),
        };
        for (id, record) in &coll.records {
            if let Some(value) = attribute_value(record, index.attribute()) {
                if built.unique && built.entries.contains_key(&value) {
                    return Err(StorageError::unique_violation(
                        collection,
                        index.attribute(),
                        value,
                    ));
                }
                built.insert(value, *id);
            }
        }

        debug!(
            "Declared {} index on {}.{} over {} records",
            if built.unique { "unique" } else { "non-unique" },
            collection,
            index.attribute(),
            coll.records.len()
        );
        coll.indexes.insert(index.attribute().to_string(), built);
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        mut data: Value,
    ) -> Result<(StorageKey, Value), Self::Error> {
        Self::as_object(&data)?;

        let mut data_guard = self.data.write().await;
        let coll = data_guard.entry(collection.to_string()).or_default();

        let id = coll.last_id + 1;
        if let Some(obj) = data.as_object_mut() {
            obj.insert("id".to_string(), json!(id));
        }

        coll.check_unique(collection, &data, None)?;

        coll.index_record(id, &data);
        coll.records.insert(id, data.clone());
        coll.last_id = id;

        trace!("Inserted {}/{}", collection, id);
        Ok((StorageKey::new(collection, id), data))
    }

    async fn update(&self, key: StorageKey, mut data: Value) -> Result<Value, Self::Error> {
        Self::as_object(&data)?;

        let mut data_guard = self.data.write().await;
        let coll = data_guard
            .get_mut(key.collection())
            .ok_or_else(|| StorageError::resource_not_found(key.collection(), key.id()))?;

        let previous = coll
            .records
            .get(&key.id())
            .cloned()
            .ok_or_else(|| StorageError::resource_not_found(key.collection(), key.id()))?;

        if let Some(obj) = data.as_object_mut() {
            obj.insert("id".to_string(), json!(key.id()));
        }

        coll.check_unique(key.collection(), &data, Some(key.id()))?;

        coll.unindex_record(key.id(), &previous);
        coll.index_record(key.id(), &data);
        coll.records.insert(key.id(), data.clone());

        trace!("Updated {}", key);
        Ok(data)
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, Self::Error> {
        let data_guard = self.data.read().await;

        let result = data_guard
            .get(key.collection())
            .and_then(|coll| coll.records.get(&key.id()))
            .cloned();

        Ok(result)
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let mut data_guard = self.data.write().await;

        let Some(coll) = data_guard.get_mut(key.collection()) else {
            return Ok(false);
        };

        match coll.records.remove(&key.id()) {
            Some(previous) => {
                coll.unindex_record(key.id(), &previous);
                trace!("Deleted {}", key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_attribute(
        &self,
        collection: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        let data_guard = self.data.read().await;

        let Some(coll) = data_guard.get(collection) else {
            return Ok(Vec::new());
        };

        let results = match coll.indexes.get(attribute) {
            Some(index) => index
                .entries
                .get(value)
                .into_iter()
                .flatten()
                .filter_map(|id| {
                    coll.records
                        .get(id)
                        .map(|data| (StorageKey::new(collection, *id), data.clone()))
                })
                .collect(),
            None => coll
                .records
                .iter()
                .filter(|(_, data)| attribute_value(data, attribute).as_deref() == Some(value))
                .map(|(id, data)| (StorageKey::new(collection, *id), data.clone()))
                .collect(),
        };

        Ok(results)
    }

    async fn scan(
        &self,
        collection: &str,
        filter: &ScanFilter,
        order: &ScanOrder,
        offset: usize,
        limit: usize,
    ) -> Result<ScanPage, Self::Error> {
        let data_guard = self.data.read().await;

        let Some(coll) = data_guard.get(collection) else {
            return Ok(ScanPage::empty());
        };

        // BTreeMap iteration is already insertion order.
        let mut matches: Vec<(u64, &Value)> = coll
            .records
            .iter()
            .filter(|(_, data)| filter.matches(data))
            .map(|(id, data)| (*id, data))
            .collect();
        let total = matches.len();

        if let ScanOrder::Attribute {
            attribute,
            direction,
        } = order
        {
            // Stable sort keeps insertion order among equal values.
            matches.sort_by(|(_, a), (_, b)| {
                let ordering = compare_values(a.get(attribute), b.get(attribute));
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let items = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, data)| (StorageKey::new(collection, id), data.clone()))
            .collect();

        Ok(ScanPage { items, total })
    }

    async fn group_count(
        &self,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<(Option<String>, usize)>, Self::Error> {
        let data_guard = self.data.read().await;

        let Some(coll) = data_guard.get(collection) else {
            return Ok(Vec::new());
        };

        if let Some(index) = coll.indexes.get(attribute) {
            let mut groups: Vec<(Option<String>, usize)> = index
                .entries
                .iter()
                .map(|(value, ids)| (Some(value.clone()), ids.len()))
                .collect();
            let indexed: usize = groups.iter().map(|(_, n)| n).sum();
            let missing = coll.records.len().saturating_sub(indexed);
            if missing > 0 {
                groups.push((None, missing));
            }
            return Ok(groups);
        }

        debug!(
            "Grouped count on unindexed attribute {}.{}, scanning {} records",
            collection,
            attribute,
            coll.records.len()
        );
        let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
        for (seen, record) in coll.records.values().enumerate() {
            *counts.entry(attribute_value(record, attribute)).or_default() += 1;
            if (seen + 1) % SCAN_CHUNK == 0 {
                tokio::task::yield_now().await;
            }
        }

        Ok(counts.into_iter().collect())
    }

    async fn count(&self, collection: &str) -> Result<usize, Self::Error> {
        let data_guard = self.data.read().await;

        let count = data_guard
            .get(collection)
            .map(|coll| coll.records.len())
            .unwrap_or(0);

        Ok(count)
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        let mut data_guard = self.data.write().await;
        for coll in data_guard.values_mut() {
            coll.records.clear();
            for index in coll.indexes.values_mut() {
                index.entries.clear();
            }
        }
        Ok(())
    }
}

/// Statistics about the current state of in-memory storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStorageStats {
    /// Number of collections that have been written to or indexed
    pub collection_count: usize,
    /// Total number of records across collections
    pub total_records: usize,
    /// Number of declared indexes across collections
    pub index_count: usize,
}
