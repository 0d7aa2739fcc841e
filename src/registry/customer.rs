//! The customer directory.

use super::query::COUNTRY_CODE_ATTRIBUTE;
use super::{
    CountryLookup, QueryService, decode, exists, first_match, holder, key, storage_error,
    write_error,
};
use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult, EntityKind};
use crate::model::{Customer, CustomerPayload, Page, PageRequest};
use crate::patterns::CodecPatterns;
use crate::storage::{IndexDefinition, StorageProvider};
use crate::validation::{CustomerSnapshot, ValidationEngine};
use chrono::Utc;
use log::{debug, info, trace, warn};
use std::sync::Arc;

pub(crate) const PHONE: &str = "phone";
pub(crate) const EMAIL: &str = "email";

const KIND: EntityKind = EntityKind::Customer;

/// Owns customer records.
///
/// Phone numbers are unique, and so are emails when present. A phone with a
/// parenthesized dial code is only accepted while some country carries that
/// ISD code, and a country code only while some country carries it as its
/// alpha-2 or alpha-3 code. Both are checked through `countries` at write
/// time only; later country changes do not revisit stored customers.
///
/// `created_at` is set once on add. `updated_at` is set on add and advanced
/// on every successful update, never moving backwards.
#[derive(Clone)]
pub struct CustomerDirectory<S, L> {
    storage: S,
    countries: L,
    engine: Arc<ValidationEngine>,
    queries: QueryService<S>,
}

impl<S: StorageProvider + Clone, L: CountryLookup> CustomerDirectory<S, L> {
    /// Open the directory over `storage`, declaring its indexes.
    pub async fn open(
        storage: S,
        countries: L,
        config: DirectoryConfig,
        engine: Arc<ValidationEngine>,
    ) -> DirectoryResult<Self> {
        for index in [
            IndexDefinition::unique(PHONE),
            IndexDefinition::unique(EMAIL),
            IndexDefinition::non_unique(COUNTRY_CODE_ATTRIBUTE),
        ] {
            storage
                .ensure_index(KIND.collection(), index)
                .await
                .map_err(storage_error)?;
        }

        Ok(Self {
            queries: QueryService::new(storage.clone(), config),
            storage,
            countries,
            engine,
        })
    }
}

impl<S: StorageProvider, L: CountryLookup> CustomerDirectory<S, L> {
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
        payload: &CustomerPayload,
        self_id: Option<u64>,
    ) -> DirectoryResult<CustomerSnapshot> {
        let phone = payload.phone.as_deref();

        let dial_code_known = match phone.and_then(|p| CodecPatterns::global().dial_code(p)) {
            Some(code) => Some(self.countries.isd_exists(code).await?),
            None => None,
        };

        let country_code_known = match payload.country_code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => Some(self.countries.code_exists(code).await?),
            None => None,
        };

        Ok(CustomerSnapshot {
            self_id,
            phone_holder: holder(&self.storage, KIND, PHONE, phone, self_id).await?,
            email_holder: holder(&self.storage, KIND, EMAIL, payload.email.as_deref(), self_id)
                .await?,
            dial_code_known,
            country_code_known,
        })
    }

    fn validate(
        &self,
        payload: &CustomerPayload,
        snapshot: &CustomerSnapshot,
    ) -> DirectoryResult<()> {
        trace!("Validating customer {:?} against {:?}", payload, snapshot);
        self.engine
            .validate_customer(payload, snapshot)
            .into_result()
            .map_err(|errors| {
                warn!("Rejected customer write: {}", errors);
                DirectoryError::from(errors)
            })
    }

    /// Validate and persist a new customer.
    pub async fn add(&self, payload: CustomerPayload) -> DirectoryResult<Customer> {
        info!("Adding customer {:?}", payload.name);

        let payload = payload.normalized(self.config().normalization);
        let snapshot = self.snapshot(&payload, None).await?;
        self.validate(&payload, &snapshot)?;

        let now = Utc::now();
        let (key, stored) = self
            .storage
            .insert(KIND.collection(), payload.to_record(now, now))
            .await
            .map_err(|e| write_error(KIND, e))?;

        debug!("Customer {} added", key);
        decode(stored)
    }

    /// Apply the non-empty fields of `patch` to customer `id` and re-validate.
    pub async fn update(&self, id: u64, patch: CustomerPayload) -> DirectoryResult<Customer> {
        info!("Updating customer {}", id);

        let stored = self.get(id).await?;
        let merged = patch
            .normalized(self.config().normalization)
            .merged_onto(&stored);
        let snapshot = self.snapshot(&merged, Some(id)).await?;
        self.validate(&merged, &snapshot)?;

        let updated_at = Utc::now().max(stored.updated_at);
        let updated = self
            .storage
            .update(key(KIND, id), merged.to_record(stored.created_at, updated_at))
            .await
            .map_err(|e| write_error(KIND, e))?;

        debug!("Customer {} updated", id);
        decode(updated)
    }

    pub async fn delete(&self, id: u64) -> DirectoryResult<()> {
        info!("Deleting customer {}", id);

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

    pub async fn find(&self, id: u64) -> DirectoryResult<Option<Customer>> {
        debug!("Getting customer {}", id);
        self.storage
            .get(key(KIND, id))
            .await
            .map_err(storage_error)?
            .map(decode)
            .transpose()
    }

    pub async fn get(&self, id: u64) -> DirectoryResult<Customer> {
        self.find(id)
            .await?
            .ok_or_else(|| DirectoryError::not_found(KIND, "id", id))
    }

    pub async fn find_by_phone(&self, phone: &str) -> DirectoryResult<Option<Customer>> {
        debug!("Looking up customer by phone '{}'", phone);
        first_match(&self.storage, KIND, PHONE, &self.lookup_key(phone))
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn get_by_phone(&self, phone: &str) -> DirectoryResult<Customer> {
        self.find_by_phone(phone)
            .await?
            .ok_or_else(|| DirectoryError::not_found(KIND, PHONE, phone))
    }

    pub async fn exists_by_phone(&self, phone: &str) -> DirectoryResult<bool> {
        exists(&self.storage, KIND, PHONE, &self.lookup_key(phone)).await
    }

    pub async fn exists_by_email(&self, email: &str) -> DirectoryResult<bool> {
        exists(&self.storage, KIND, EMAIL, &self.lookup_key(email)).await
    }

    /// Whether a new customer could take `phone` without a uniqueness violation.
    pub async fn is_phone_available(&self, phone: &str) -> DirectoryResult<bool> {
        Ok(!self.exists_by_phone(phone).await?)
    }

    pub async fn is_email_available(&self, email: &str) -> DirectoryResult<bool> {
        Ok(!self.exists_by_email(email).await?)
    }

    pub async fn list(&self, request: &PageRequest) -> DirectoryResult<Page<Customer>> {
        self.queries.customers(request).await
    }

    pub async fn list_by_name_contains(
        &self,
        fragment: &str,
        request: &PageRequest,
    ) -> DirectoryResult<Page<Customer>> {
        self.queries.customers_by_name_contains(fragment, request).await
    }

    pub async fn list_by_country_code(
        &self,
        code: &str,
        request: &PageRequest,
    ) -> DirectoryResult<Page<Customer>> {
        self.queries.customers_by_country_code(code, request).await
    }

    pub async fn count(&self) -> DirectoryResult<usize> {
        self.storage
            .count(KIND.collection())
            .await
            .map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::lookup::fixed::FixedCountries;
    use crate::storage::InMemoryStorage;
    use crate::validation::Rule;

    async fn directory() -> CustomerDirectory<InMemoryStorage, FixedCountries> {
        CustomerDirectory::open(
            InMemoryStorage::new(),
            FixedCountries(vec![("EG", "EGY", "20"), ("US", "USA", "1")]),
            DirectoryConfig::default(),
            Arc::new(ValidationEngine::new()),
        )
        .await
        .unwrap()
    }

    fn walid() -> CustomerPayload {
        CustomerPayload::new("Walid Mohamed", "(20) 123-547-8915")
            .with_email("walid@example.com")
            .with_country_code("EG")
            .with_gender("male")
    }

    #[tokio::test]
    async fn test_add_sets_both_timestamps() {
        let directory = directory().await;
        let customer = directory.add(walid()).await.unwrap();

        assert_eq!(customer.created_at, customer.updated_at);
        assert_eq!(customer.dial_code(), Some("20"));
        assert_eq!(directory.get_by_phone("(20) 123-547-8915").await.unwrap(), customer);
    }

    #[tokio::test]
    async fn test_unknown_dial_code_rejected() {
        let directory = directory().await;
        let err = directory
            .add(CustomerPayload::new("Walid Mohamed", "(999) 123-547-8915"))
            .await
            .unwrap_err();

        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, PHONE);
        assert_eq!(err.violations()[0].rule, Rule::CrossReference);
    }

    #[tokio::test]
    async fn test_bare_prefix_is_not_cross_checked() {
        let directory = directory().await;
        assert!(directory
            .add(CustomerPayload::new("Walid Mohamed", "999 123 547 8915"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_phone_and_email() {
        let directory = directory().await;
        directory.add(walid()).await.unwrap();

        let err = directory
            .add(
                CustomerPayload::new("Someone Else", "(20) 123-547-8915")
                    .with_email("walid@example.com"),
            )
            .await
            .unwrap_err();
        assert!(err.concerns_field(PHONE));
        assert!(err.concerns_field(EMAIL));
        assert_eq!(directory.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_customers_without_email_do_not_collide() {
        let directory = directory().await;
        directory
            .add(CustomerPayload::new("First Person", "(1) 123-456-7"))
            .await
            .unwrap();
        directory
            .add(CustomerPayload::new("Second Person", "(1) 123-456-8").with_email(""))
            .await
            .unwrap();
        assert_eq!(directory.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_country_code_rejected() {
        let directory = directory().await;
        let err = directory
            .add(walid().with_country_code("ZZ"))
            .await
            .unwrap_err();
        assert!(err.concerns_field(COUNTRY_CODE_ATTRIBUTE));

        // Alpha-3 codes are accepted too.
        assert!(directory.add(walid().with_country_code("EGY")).await.is_ok());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let directory = directory().await;
        let added = directory.add(walid()).await.unwrap();

        let updated = directory
            .update(added.id, CustomerPayload::default().with_name("Walid M."))
            .await
            .unwrap();

        assert_eq!(updated.name, "Walid M.");
        assert_eq!(updated.phone, added.phone);
        assert_eq!(updated.email, added.email);
        assert_eq!(updated.country_code, added.country_code);
        assert_eq!(updated.created_at, added.created_at);
        assert!(updated.updated_at >= added.updated_at);
    }

    #[tokio::test]
    async fn test_update_may_keep_own_phone() {
        let directory = directory().await;
        let added = directory.add(walid()).await.unwrap();
        let updated = directory
            .update(added.id, CustomerPayload::default().with_phone("(20) 123-547-8915"))
            .await
            .unwrap();
        assert_eq!(updated.phone, added.phone);
    }

    #[tokio::test]
    async fn test_availability_follows_delete() {
        let directory = directory().await;
        assert!(directory.is_phone_available("(20) 123-547-8915").await.unwrap());

        let added = directory.add(walid()).await.unwrap();
        assert!(!directory.is_phone_available("(20) 123-547-8915").await.unwrap());
        assert!(directory.exists_by_email("walid@example.com").await.unwrap());

        directory.delete(added.id).await.unwrap();
        assert!(!directory.exists_by_phone("(20) 123-547-8915").await.unwrap());
        assert!(directory.is_email_available("walid@example.com").await.unwrap());
        assert!(matches!(
            directory.get_by_phone("(20) 123-547-8915").await,
            Err(DirectoryError::NotFound { entity_kind: EntityKind::Customer, .. })
        ));
    }

    #[tokio::test]
    async fn test_name_filter_ignores_case() {
        let directory = directory().await;
        directory.add(walid()).await.unwrap();
        directory
            .add(CustomerPayload::new("Yosaf Karrouch", "(1) 600-798-9253"))
            .await
            .unwrap();

        let page = directory
            .list_by_name_contains("MOHA", &PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].name, "Walid Mohamed");
    }
}
