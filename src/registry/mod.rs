//! Record owners and the query layer.
//!
//! * [`CountryRegistry`] owns countries and answers the [`CountryLookup`]
//!   queries customer validation depends on.
//! * [`CustomerDirectory`] owns customers and cross-checks them against a
//!   `CountryLookup`, never against the registry type itself.
//! * [`QueryService`] serves paged listings and grouped counts.
//!
//! Every write runs the same sequence: normalize the payload, capture a
//! snapshot of the lookups its rules need, validate, then persist. The store's
//! unique indexes make the persist step the final authority, so a write that
//! loses a race after validation fails with [`DirectoryError::Conflict`].

pub mod country;
pub mod customer;
pub mod lookup;
pub mod query;

pub use country::CountryRegistry;
pub use customer::CustomerDirectory;
pub use lookup::CountryLookup;
pub use query::QueryService;

use crate::error::{DirectoryError, EntityKind};
use crate::storage::{StorageError, StorageKey, StorageProvider};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn storage_error<E: Into<StorageError>>(error: E) -> DirectoryError {
    DirectoryError::from(error.into())
}

/// Map a failed write, logging lost uniqueness races.
pub(crate) fn write_error<E: Into<StorageError>>(kind: EntityKind, error: E) -> DirectoryError {
    let error = storage_error(error);
    if let DirectoryError::Conflict { field, value } = &error {
        warn!(
            "{} write lost a uniqueness race on {} = '{}'",
            kind, field, value
        );
    }
    error
}

pub(crate) fn decode<T: DeserializeOwned>(record: Value) -> Result<T, DirectoryError> {
    Ok(serde_json::from_value(record)?)
}

/// Id of the record holding `value` under a unique attribute, other than `self_id`.
pub(crate) async fn holder<S: StorageProvider>(
    storage: &S,
    kind: EntityKind,
    attribute: &str,
    value: Option<&str>,
    self_id: Option<u64>,
) -> Result<Option<u64>, DirectoryError> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let matches = storage
        .find_by_attribute(kind.collection(), attribute, value)
        .await
        .map_err(storage_error)?;

    Ok(matches
        .iter()
        .map(|(key, _)| key.id())
        .find(|id| Some(*id) != self_id))
}

/// Whether any record holds `value` under `attribute`.
pub(crate) async fn exists<S: StorageProvider>(
    storage: &S,
    kind: EntityKind,
    attribute: &str,
    value: &str,
) -> Result<bool, DirectoryError> {
    Ok(first_match(storage, kind, attribute, value).await?.is_some())
}

pub(crate) async fn first_match<S: StorageProvider>(
    storage: &S,
    kind: EntityKind,
    attribute: &str,
    value: &str,
) -> Result<Option<Value>, DirectoryError> {
    if value.is_empty() {
        return Ok(None);
    }

    let matches = storage
        .find_by_attribute(kind.collection(), attribute, value)
        .await
        .map_err(storage_error)?;

    Ok(matches.into_iter().next().map(|(_, record)| record))
}

pub(crate) fn key(kind: EntityKind, id: u64) -> StorageKey {
    StorageKey::new(kind.collection(), id)
}
