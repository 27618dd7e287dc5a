use crate::error::FetchError;
use crate::models::Listing;

/// Result of one paginated search.
///
/// A failed page aborts the remaining pagination but keeps everything
/// collected so far, so listings and an error can both be present.
#[derive(Debug)]
pub struct SearchOutcome {
    pub listings: Vec<Listing>,
    pub error: Option<FetchError>,
}

impl SearchOutcome {
    pub fn complete(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            error: None,
        }
    }

    pub fn interrupted(listings: Vec<Listing>, error: FetchError) -> Self {
        Self {
            listings,
            error: Some(error),
        }
    }

    /// True when every requested page was fetched without a transport
    /// or status failure.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}
