//! A storage wrapper whose grouped counts take a fixed delay.

use phone_directory::storage::{
    IndexDefinition, InMemoryStorage, ScanFilter, ScanOrder, ScanPage, StorageError, StorageKey,
    StorageProvider,
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone)]
pub struct SlowStorage {
    inner: InMemoryStorage,
    group_delay: Duration,
    completed_groupings: Arc<AtomicUsize>,
}

impl SlowStorage {
    pub fn new(group_delay: Duration) -> Self {
        Self {
            inner: InMemoryStorage::new(),
            group_delay,
            completed_groupings: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Grouped counts that ran to completion.
    pub fn completed_groupings(&self) -> usize {
        self.completed_groupings.load(Ordering::SeqCst)
    }
}

impl StorageProvider for SlowStorage {
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
        tokio::time::sleep(self.group_delay).await;
        let groups = self.inner.group_count(collection, attribute).await?;
        self.completed_groupings.fetch_add(1, Ordering::SeqCst);
        Ok(groups)
    }

    async fn count(&self, collection: &str) -> Result<usize, Self::Error> {
        self.inner.count(collection).await
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        self.inner.clear().await
    }
}
