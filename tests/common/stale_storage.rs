//! A storage wrapper whose attribute lookups never see customers.
//!
//! Every pre-write uniqueness check then passes, as if another writer had
//! committed between the snapshot and the write. Only the unique indexes
//! stand between the caller and a duplicate.

use phone_directory::storage::{
    IndexDefinition, InMemoryStorage, ScanFilter, ScanOrder, ScanPage, StorageError, StorageKey,
    StorageProvider,
};
use serde_json::Value;

const BLIND_COLLECTION: &str = "customers";

#[derive(Clone, Default)]
pub struct StaleStorage {
    inner: InMemoryStorage,
}

impl StaleStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageProvider for StaleStorage {
    type Error = StorageError;

    async fn ensure_index(
        &self,
        collection: &str,
        index: IndexDefinition,
    ) -> Result<(), Self::Error> {
        self.inner.ensure_index(collection, index).await
    }

    async fn insert(
        &self,
        collection: &str,
        data: Value,
    ) -> Result<(StorageKey, Value), Self::Error> {
        self.inner.insert(collection, data).await
    }

    async fn update(&self, key: StorageKey, data: Value) -> Result<Value, Self::Error> {
        self.inner.update(key, data).await
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, Self::Error> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, Self::Error> {
        self.inner.delete(key).await
    }

    async fn find_by_attribute(
        &self,
        collection: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        if collection == BLIND_COLLECTION {
            return Ok(Vec::new());
        }
        self.inner.find_by_attribute(collection, attribute, value).await
    }

    async fn scan(
        &self,
        collection: &str,
        filter: &ScanFilter,
        order: &ScanOrder,
        offset: usize,
        limit: usize,
    ) -> Result<ScanPage, Self::Error> {
        self.inner.scan(collection, filter, order, offset, limit).await
    }

    async fn group_count(
        &self,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<(Option<String>, usize)>, Self::Error> {
        self.inner.group_count(collection, attribute).await
    }

    async fn count(&self, collection: &str) -> Result<usize, Self::Error> {
        self.inner.count(collection).await
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        self.inner.clear().await
    }
}
