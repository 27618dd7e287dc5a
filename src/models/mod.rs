use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Category;

/// Normalized marketplace listing.
///
/// Identity is `id`; every other field only changes through a re-fetch,
/// never by patching in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: u64,
    pub title: String,
    /// Decimal amount as the upstream reports it, currency implied.
    pub price: String,
    pub brand: String,
    pub condition: String,
    /// Absolute link to the listing page.
    pub url: String,
    /// `None` when the upstream timestamp was missing or unparseable.
    pub created_at: Option<DateTime<Utc>>,
}

/// A (search term, category) pair. Value object, no identity beyond its
/// contents; this is what favorites persist and replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search: String,
    pub category: Category,
}

impl SearchQuery {
    pub fn new(search: impl Into<String>, category: Category) -> Self {
        Self {
            search: search.into(),
            category,
        }
    }
}
