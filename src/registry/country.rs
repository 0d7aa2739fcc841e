//! The country registry.

use super::{
    CountryLookup, QueryService, decode, exists, first_match, holder, key, storage_error,
    write_error,
};
use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult, EntityKind};
use crate::model::{Country, CountryPayload, Page, PageRequest};
use crate::storage::{IndexDefinition, ScanFilter, StorageProvider};
use crate::validation::{CountrySnapshot, ValidationEngine};
use log::{debug, info, trace, warn};
use std::sync::Arc;

pub(crate) const ALPHA2: &str = "alpha_2_code";
pub(crate) const ALPHA3: &str = "alpha_3_code";
pub(crate) const ISD: &str = "isd_code";

const KIND: EntityKind = EntityKind::Country;

/// Owns country records and keeps their alpha-2, alpha-3 and ISD codes unique.
///
/// Deleting or re-coding a country never touches customers that reference it.
#[derive(Clone)]
pub struct CountryRegistry<S> {
    storage: S,
    engine: Arc<ValidationEngine>,
    queries: QueryService<S>,
}

impl<S: StorageProvider + Clone> CountryRegistry<S> {
    /// Open the registry over `storage`, declaring its unique indexes.
    pub async fn open(
        storage: S,
        config: DirectoryConfig,
        engine: Arc<ValidationEngine>,
    ) -> DirectoryResult<Self> {
        for attribute in [ALPHA2, ALPHA3, ISD] {
            storage
                .ensure_index(KIND.collection(), IndexDefinition::unique(attribute))
                .await
                .map_err(storage_error)?;
        }

        Ok(Self {
            queries: QueryService::new(storage.clone(), config),
            storage,
            engine,
        })
    }
}

impl<S: StorageProvider> CountryRegistry<S> {
    fn config(&self) -> &DirectoryConfig {
        self.queries.config()
    }

    fn lookup_key(&self, value: &str) -> String {
        self.config()
            .normalization
            .apply(Some(value.to_string()))
            .unwrap_or_default()
    }

    async fn snapshot(
        &self,
        payload: &CountryPayload,
        self_id: Option<u64>,
    ) -> DirectoryResult<CountrySnapshot> {
        let storage = &self.storage;
        Ok(CountrySnapshot {
            self_id,
            alpha2_holder: holder(storage, KIND, ALPHA2, payload.alpha2_code.as_deref(), self_id)
                .await?,
            alpha3_holder: holder(storage, KIND, ALPHA3, payload.alpha3_code.as_deref(), self_id)
                .await?,
            isd_holder: holder(storage, KIND, ISD, payload.isd.as_deref(), self_id).await?,
        })
    }

    fn validate(
        &self,
        payload: &CountryPayload,
        snapshot: &CountrySnapshot,
    ) -> DirectoryResult<()> {
        trace!("Validating country {:?} against {:?}", payload, snapshot);
        self.engine
            .validate_country(payload, snapshot)
            .into_result()
            .map_err(|errors| {
                warn!("Rejected country write: {}", errors);
                DirectoryError::from(errors)
            })
    }

    /// Validate and persist a new country.
    pub async fn add(&self, payload: CountryPayload) -> DirectoryResult<Country> {
        info!("Adding country {:?}", payload.name);

        let payload = payload.normalized(self.config().normalization);
        let snapshot = self.snapshot(&payload, None).await?;
        self.validate(&payload, &snapshot)?;

        let (key, stored) = self
            .storage
            .insert(KIND.collection(), payload.to_record())
            .await
            .map_err(|e| write_error(KIND, e))?;

        debug!("Country {} added", key);
        decode(stored)
    }

    /// Apply the non-empty fields of `patch` to country `id` and re-validate.
    pub async fn update(&self, id: u64, patch: CountryPayload) -> DirectoryResult<Country> {
        info!("Updating country {}", id);

        let stored = self.get(id).await?;
        let merged = patch
            .normalized(self.config().normalization)
            .merged_onto(&stored);
        let snapshot = self.snapshot(&merged, Some(id)).await?;
        self.validate(&merged, &snapshot)?;

        let updated = self
            .storage
            .update(key(KIND, id), merged.to_record())
            .await
            .map_err(|e| write_error(KIND, e))?;

        debug!("Country {} updated", id);
        decode(updated)
    }

    pub async fn delete(&self, id: u64) -> DirectoryResult<()> {
        info!("Deleting country {}", id);

        let deleted = self
            .storage
            .delete(key(KIND, id))
            .await
            .map_err(storage_error)?;

        if deleted {
            Ok(())
        } else {
            Err(DirectoryError::not_found(KIND, "id", id))
        }
    }

    pub async fn find(&self, id: u64) -> DirectoryResult<Option<Country>> {
        debug!("Getting country {}", id);
        self.storage
            .get(key(KIND, id))
            .await
            .map_err(storage_error)?
            .map(decode)
            .transpose()
    }

    pub async fn get(&self, id: u64) -> DirectoryResult<Country> {
        self.find(id)
            .await?
            .ok_or_else(|| DirectoryError::not_found(KIND, "id", id))
    }

    async fn find_by(&self, attribute: &str, value: &str) -> DirectoryResult<Option<Country>> {
        debug!("Looking up country by {} '{}'", attribute, value);
        first_match(&self.storage, KIND, attribute, &self.lookup_key(value))
            .await?
            .map(decode)
            .transpose()
    }

    async fn get_by(&self, attribute: &str, value: &str) -> DirectoryResult<Country> {
        self.find_by(attribute, value)
            .await?
            .ok_or_else(|| DirectoryError::not_found(KIND, attribute, value))
    }

    pub async fn find_by_alpha2(&self, code: &str) -> DirectoryResult<Option<Country>> {
        self.find_by(ALPHA2, code).await
    }

    pub async fn find_by_alpha3(&self, code: &str) -> DirectoryResult<Option<Country>> {
        self.find_by(ALPHA3, code).await
    }

    pub async fn find_by_isd(&self, isd: &str) -> DirectoryResult<Option<Country>> {
        self.find_by(ISD, isd).await
    }

    pub async fn get_by_alpha2(&self, code: &str) -> DirectoryResult<Country> {
        self.get_by(ALPHA2, code).await
    }

    pub async fn get_by_alpha3(&self, code: &str) -> DirectoryResult<Country> {
        self.get_by(ALPHA3, code).await
    }

    pub async fn get_by_isd(&self, isd: &str) -> DirectoryResult<Country> {
        self.get_by(ISD, isd).await
    }

    pub async fn exists_by_alpha2(&self, code: &str) -> DirectoryResult<bool> {
        exists(&self.storage, KIND, ALPHA2, &self.lookup_key(code)).await
    }

    pub async fn exists_by_alpha3(&self, code: &str) -> DirectoryResult<bool> {
        exists(&self.storage, KIND, ALPHA3, &self.lookup_key(code)).await
    }

    pub async fn exists_by_isd(&self, isd: &str) -> DirectoryResult<bool> {
        exists(&self.storage, KIND, ISD, &self.lookup_key(isd)).await
    }

    /// Countries in insertion order, or by the request's sort.
    pub async fn list(&self, request: &PageRequest) -> DirectoryResult<Page<Country>> {
        self.queries.page(KIND, &ScanFilter::All, request).await
    }

    pub async fn count(&self) -> DirectoryResult<usize> {
        self.storage
            .count(KIND.collection())
            .await
            .map_err(storage_error)
    }
}

impl<S: StorageProvider> CountryLookup for CountryRegistry<S> {
    async fn isd_exists(&self, isd: &str) -> DirectoryResult<bool> {
        exists(&self.storage, KIND, ISD, isd).await
    }

    async fn code_exists(&self, code: &str) -> DirectoryResult<bool> {
        Ok(exists(&self.storage, KIND, ALPHA2, code).await?
            || exists(&self.storage, KIND, ALPHA3, code).await?)
    }
}
