//! The directory facade.
//!
//! A [`Directory`] wires a [`CountryRegistry`], a [`CustomerDirectory`] that
//! cross-checks against it, and a [`QueryService`] over one shared store.
//! Build one with [`DirectoryBuilder`].
//!
//! ```rust
//! use phone_directory::model::{CountryPayload, CustomerPayload};
//! use phone_directory::storage::InMemoryStorage;
//! use phone_directory::{DirectoryBuilder, DirectoryError};
//!
//! # async fn example() -> Result<(), DirectoryError> {
//! let directory = DirectoryBuilder::new(InMemoryStorage::new()).build().await?;
//!
//! directory
//!     .countries()
//!     .add(CountryPayload::new("Egypt", "EG", "EGY", "20"))
//!     .await?;
//! let customer = directory
//!     .customers()
//!     .add(CustomerPayload::new("Walid Mohamed", "(20) 123-547-8915").with_country_code("EG"))
//!     .await?;
//!
//! assert_eq!(customer.dial_code(), Some("20"));
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::DirectoryBuilder;

use crate::config::DirectoryConfig;
use crate::model::PageRequest;
use crate::registry::{CountryRegistry, CustomerDirectory, QueryService};

/// Countries, customers and queries over one store.
#[derive(Clone)]
pub struct Directory<S> {
    countries: CountryRegistry<S>,
    customers: CustomerDirectory<S, CountryRegistry<S>>,
    queries: QueryService<S>,
    storage: S,
}

impl<S> Directory<S> {
    pub fn countries(&self) -> &CountryRegistry<S> {
        &self.countries
    }

    pub fn customers(&self) -> &CustomerDirectory<S, CountryRegistry<S>> {
        &self.customers
    }

    pub fn queries(&self) -> &QueryService<S> {
        &self.queries
    }

    /// The backing store, e.g. for inspecting backend statistics.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: crate::storage::StorageProvider> Directory<S> {
    pub fn config(&self) -> &DirectoryConfig {
        self.queries.config()
    }

    /// A first-page request of the configured default size.
    pub fn first_page(&self) -> PageRequest {
        self.queries.first_page()
    }
}
