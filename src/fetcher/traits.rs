use async_trait::async_trait;

use crate::fetcher::types::SearchOutcome;
use crate::models::SearchQuery;

/// Common trait for listing sources.
/// This allows easy addition of new marketplaces in the future.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Run one paginated search against the source, returning at most
    /// `limit` normalized listings.
    async fn search(&self, query: &SearchQuery, limit: usize) -> SearchOutcome;

    /// Get the name of the listing source
    fn source_name(&self) -> &'static str;
}
