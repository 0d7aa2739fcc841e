//! Builder for [`Directory`].

use super::Directory;
use crate::config::{DirectoryConfig, Normalization};
use crate::error::DirectoryResult;
use crate::registry::{CountryRegistry, CustomerDirectory, QueryService};
use crate::storage::StorageProvider;
use crate::validation::ValidationEngine;
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring and opening a [`Directory`].
///
/// Starts from [`DirectoryConfig::default`]. `build` validates the
/// configuration and declares every index the registries rely on, so a
/// built directory always has its unique constraints in place.
///
/// ```rust
/// use phone_directory::config::Normalization;
/// use phone_directory::storage::InMemoryStorage;
/// use phone_directory::DirectoryBuilder;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), phone_directory::DirectoryError> {
/// let directory = DirectoryBuilder::new(InMemoryStorage::new())
///     .with_max_page_size(500)
///     .with_aggregate_timeout(Some(Duration::from_secs(5)))
///     .with_normalization(Normalization::Trim)
///     .build()
///     .await?;
/// assert_eq!(directory.config().max_page_size, 500);
/// # Ok(())
/// # }
/// ```
pub struct DirectoryBuilder<S> {
    storage: S,
    config: DirectoryConfig,
}

impl<S: StorageProvider + Clone> DirectoryBuilder<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: DirectoryConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: DirectoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.config.default_page_size = size;
        self
    }

    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.config.max_page_size = size;
        self
    }

    /// Bound grouped aggregations; `None` leaves them unbounded.
    pub fn with_aggregate_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.aggregate_timeout = timeout;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.config.normalization = normalization;
        self
    }

    /// Validate the configuration, declare indexes and open the directory.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an invalid configuration; a storage error if an
    /// index cannot be declared, e.g. because existing records already
    /// duplicate a unique value.
    pub async fn build(self) -> DirectoryResult<Directory<S>> {
        self.config.validate()?;

        let engine = Arc::new(ValidationEngine::new());
        let countries =
            CountryRegistry::open(self.storage.clone(), self.config.clone(), engine.clone())
                .await?;
        let customers = CustomerDirectory::open(
            self.storage.clone(),
            countries.clone(),
            self.config.clone(),
            engine,
        )
        .await?;

        info!(
            "Directory opened (page size {}/{}, aggregate timeout {:?}, {:?} normalization)",
            self.config.default_page_size,
            self.config.max_page_size,
            self.config.aggregate_timeout,
            self.config.normalization
        );

        Ok(Directory {
            countries,
            customers,
            queries: QueryService::new(self.storage.clone(), self.config),
            storage: self.storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;
    use crate::storage::InMemoryStorage;

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let result = DirectoryBuilder::new(InMemoryStorage::new())
            .with_default_page_size(50)
            .with_max_page_size(10)
            .build()
            .await;
        assert!(matches!(result, Err(DirectoryError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_build_declares_indexes() {
        let storage = InMemoryStorage::new();
        let directory = DirectoryBuilder::new(storage.clone()).build().await.unwrap();

        let stats = directory.storage().stats().await;
        assert_eq!(stats.collection_count, 2);
        // Three country codes, plus phone, email and country_code on customers.
        assert_eq!(stats.index_count, 6);
        assert_eq!(
            directory.storage().list_collections().await,
            vec!["countries".to_string(), "customers".to_string()]
        );
        assert_eq!(directory.first_page().size, 20);
    }

    #[tokio::test]
    async fn test_reopening_over_same_store() {
        let storage = InMemoryStorage::new();
        DirectoryBuilder::new(storage.clone()).build().await.unwrap();
        assert!(DirectoryBuilder::new(storage).build().await.is_ok());
    }
}
