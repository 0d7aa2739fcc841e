//! Paged listings and grouped counts.
//!
//! Listings return committed records in insertion order unless the request
//! carries an explicit sort, together with the total number of matches.
//! Page requests are checked against the configured limits on every call: a
//! size of zero, a size above `max_page_size`, or a sort on an attribute the
//! record kind does not allow is an invalid argument.

use super::{decode, storage_error};
use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult, EntityKind};
use crate::model::{CountryCodeCount, Customer, Page, PageRequest};
use crate::storage::{ScanFilter, ScanOrder, StorageProvider};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Attributes a country listing may be sorted by.
pub const COUNTRY_SORT_ATTRIBUTES: &[&str] =
    &["id", "name", "alpha_2_code", "alpha_3_code", "isd_code"];

/// Attributes a customer listing may be sorted by.
pub const CUSTOMER_SORT_ATTRIBUTES: &[&str] = &[
    "id",
    "name",
    "country_code",
    "phone",
    "email",
    "gender",
    "createdAt",
    "updatedAt",
];

pub(crate) const COUNTRY_CODE_ATTRIBUTE: &str = "country_code";

const COUNTS_OPERATION: &str = "counts_by_country_code";

#[derive(Debug, Clone)]
pub struct QueryService<S> {
    storage: S,
    config: DirectoryConfig,
}

impl<S: StorageProvider> QueryService<S> {
    pub fn new(storage: S, config: DirectoryConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// A first-page request of the configured default size.
    pub fn first_page(&self) -> PageRequest {
        PageRequest::first(self.config.default_page_size)
    }

    /// Check a page request and resolve its scan order.
    pub fn scan_order(
        &self,
        kind: EntityKind,
        request: &PageRequest,
    ) -> DirectoryResult<ScanOrder> {
        if request.size == 0 || request.size > self.config.max_page_size {
            return Err(DirectoryError::invalid_argument(format!(
                "page size must be between 1 and {}, got {}",
                self.config.max_page_size, request.size
            )));
        }

        if request.page.checked_mul(request.size).is_none() {
            return Err(DirectoryError::invalid_argument(format!(
                "page {} of size {} is out of range",
                request.page, request.size
            )));
        }

        let Some(sort) = &request.sort else {
            return Ok(ScanOrder::Insertion);
        };

        let allowed = match kind {
            EntityKind::Country => COUNTRY_SORT_ATTRIBUTES,
            EntityKind::Customer => CUSTOMER_SORT_ATTRIBUTES,
        };
        if !allowed.contains(&sort.property.as_str()) {
            return Err(DirectoryError::invalid_argument(format!(
                "cannot sort {} records by '{}'",
                kind, sort.property
            )));
        }

        Ok(ScanOrder::Attribute {
            attribute: sort.property.clone(),
            direction: sort.direction,
        })
    }

    /// One page of `kind` records matching `filter`.
    pub async fn page<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        filter: &ScanFilter,
        request: &PageRequest,
    ) -> DirectoryResult<Page<T>> {
        let order = self.scan_order(kind, request)?;

        let scan = self
            .storage
            .scan(
                kind.collection(),
                filter,
                &order,
                request.offset(),
                request.size,
            )
            .await
            .map_err(storage_error)?;

        debug!(
            "{} page {} (size {}): {} of {} matches",
            kind,
            request.page,
            request.size,
            scan.items.len(),
            scan.total
        );

        let content = scan
            .items
            .into_iter()
            .map(|(_, record)| decode(record))
            .collect::<DirectoryResult<Vec<T>>>()?;

        Ok(Page::new(content, request, scan.total))
    }

    pub async fn customers(&self, request: &PageRequest) -> DirectoryResult<Page<Customer>> {
        self.page(EntityKind::Customer, &ScanFilter::All, request).await
    }

    /// Customers whose name contains `fragment`, ignoring case.
    pub async fn customers_by_name_contains(
        &self,
        fragment: &str,
        request: &PageRequest,
    ) -> DirectoryResult<Page<Customer>> {
        let filter = ScanFilter::contains_ignore_case("name", fragment);
        self.page(EntityKind::Customer, &filter, request).await
    }

    /// Customers whose country code equals `code`, ignoring case.
    pub async fn customers_by_country_code(
        &self,
        code: &str,
        request: &PageRequest,
    ) -> DirectoryResult<Page<Customer>> {
        let filter = ScanFilter::equals_ignore_case(COUNTRY_CODE_ATTRIBUTE, code);
        self.page(EntityKind::Customer, &filter, request).await
    }

    /// Customer counts per country code, largest first.
    ///
    /// Ties are ordered by country code; customers without a code are counted
    /// under `None`, which orders before every code. Bounded by the configured
    /// `aggregate_timeout`.
    pub async fn counts_by_country_code(&self) -> DirectoryResult<Vec<CountryCodeCount>> {
        match self.config.aggregate_timeout {
            Some(limit) => tokio::time::timeout(limit, self.grouped_counts())
                .await
                .map_err(|_| {
                    warn!("{} exceeded {:?}", COUNTS_OPERATION, limit);
                    DirectoryError::Timeout {
                        operation: COUNTS_OPERATION.to_string(),
                        duration: limit,
                    }
                })?,
            None => self.grouped_counts().await,
        }
    }

    /// Like [`counts_by_country_code`](Self::counts_by_country_code), but
    /// abandoned as soon as `cancel` completes.
    ///
    /// ```rust
    /// use phone_directory::{DirectoryBuilder, DirectoryError, storage::InMemoryStorage};
    ///
    /// # async fn example() -> Result<(), DirectoryError> {
    /// let directory = DirectoryBuilder::new(InMemoryStorage::new()).build().await?;
    /// let counts = directory
    ///     .queries()
    ///     .counts_by_country_code_until(std::future::pending::<()>())
    ///     .await?;
    /// assert!(counts.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn counts_by_country_code_until<F>(
        &self,
        cancel: F,
    ) -> DirectoryResult<Vec<CountryCodeCount>>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!("{} cancelled by caller", COUNTS_OPERATION);
                Err(DirectoryError::Cancelled {
                    operation: COUNTS_OPERATION.to_string(),
                })
            }
            counts = self.counts_by_country_code() => counts,
        }
    }

    async fn grouped_counts(&self) -> DirectoryResult<Vec<CountryCodeCount>> {
        let groups = self
            .storage
            .group_count(EntityKind::Customer.collection(), COUNTRY_CODE_ATTRIBUTE)
            .await
            .map_err(storage_error)?;

        let mut counts: Vec<CountryCodeCount> = groups
            .into_iter()
            .map(|(country_code, count)| CountryCodeCount {
                country_code,
                count,
            })
            .collect();
        counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.country_code.cmp(&b.country_code))
        });

        debug!("{}: {} groups", COUNTS_OPERATION, counts.len());
        Ok(counts)
    }
}
