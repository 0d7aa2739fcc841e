//! Phone directory library for Rust.
//!
//! Keeps two related record sets mutually consistent: countries, with unique
//! alpha-2, alpha-3 and ISD codes, and customers, whose unique phone numbers
//! must carry a dial code some country owns.
//!
//! # Core Components
//!
//! - [`CountryRegistry`] - Country records and code lookups
//! - [`CustomerDirectory`] - Customer records, cross-checked against countries
//! - [`ValidationEngine`] - Per-field rule pipelines with structured violations
//! - [`QueryService`] - Paged listings and grouped counts
//! - [`StorageProvider`] - Trait for storage backends with atomic unique indexes
//!
//! # Quick Start
//!
//! ```rust
//! use phone_directory::model::{CountryPayload, CustomerPayload};
//! use phone_directory::storage::InMemoryStorage;
//! use phone_directory::DirectoryBuilder;
//!
//! # async fn example() -> Result<(), phone_directory::DirectoryError> {
//! let directory = DirectoryBuilder::new(InMemoryStorage::new()).build().await?;
//! directory
//!     .countries()
//!     .add(CountryPayload::new("Morocco", "MA", "MAR", "212"))
//!     .await?;
//!
//! // Rejected: no country has ISD code 999.
//! let rejected = directory
//!     .customers()
//!     .add(CustomerPayload::new("Yosaf Karrouch", "(999) 600-798-9253"))
//!     .await;
//! assert!(rejected.is_err());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod patterns;
pub mod registry;
pub mod storage;
pub mod validation;

pub use config::{DirectoryConfig, Normalization};
pub use directory::{Directory, DirectoryBuilder};
pub use error::{DirectoryError, DirectoryResult, EntityKind, ValidationErrors};
pub use patterns::CodecPatterns;
pub use registry::{CountryLookup, CountryRegistry, CustomerDirectory, QueryService};
pub use storage::{InMemoryStorage, StorageError, StorageProvider};
pub use validation::{Rule, ValidationEngine, ValidationReport, Violation};
