//! Read-only country lookups used by customer validation.

use crate::error::DirectoryResult;
use std::future::Future;
use std::sync::Arc;

/// The country queries a customer write depends on.
///
/// `CustomerDirectory` holds one of these rather than a `CountryRegistry`,
/// so customers reference countries without owning them and tests can
/// substitute a fixed set of codes.
pub trait CountryLookup: Send + Sync {
    /// Whether some country's ISD code equals `isd` exactly.
    fn isd_exists(&self, isd: &str) -> impl Future<Output = DirectoryResult<bool>> + Send;

    /// Whether some country's alpha-2 or alpha-3 code equals `code` exactly.
    fn code_exists(&self, code: &str) -> impl Future<Output = DirectoryResult<bool>> + Send;
}

impl<L: CountryLookup> CountryLookup for Arc<L> {
    async fn isd_exists(&self, isd: &str) -> DirectoryResult<bool> {
        self.as_ref().isd_exists(isd).await
    }

    async fn code_exists(&self, code: &str) -> DirectoryResult<bool> {
        self.as_ref().code_exists(code).await
    }
}
