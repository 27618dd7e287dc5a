use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::Listing;

/// Depth-1 history of the most recent full fetch, used as the baseline
/// for detecting new listings.
///
/// Each store instance owns one file path, so callers that need isolated
/// baselines (per user, per query) create one store per scope rather than
/// sharing a single process-wide file. Concurrent writers to the same
/// path are still unsupported.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Diff `current` against the stored snapshot and replace the
    /// snapshot with `current`.
    ///
    /// With no prior snapshot, everything in `current` is new. Otherwise
    /// the new subset is every listing whose id is absent from the prior
    /// snapshot, in `current` order; duplicate ids within `current` are
    /// not deduplicated. The snapshot is overwritten unconditionally,
    /// whether or not anything was new.
    pub fn detect_new(&self, current: &[Listing]) -> Result<Vec<Listing>, StoreError> {
        let new_listings = match self.load()? {
            None => {
                info!("No previous snapshot, treating all {} listings as new", current.len());
                current.to_vec()
            }
            Some(previous) => {
                let known: HashSet<u64> = previous.iter().map(|l| l.id).collect();
                current
                    .iter()
                    .filter(|l| !known.contains(&l.id))
                    .cloned()
                    .collect()
            }
        };

        self.persist(current)?;
        Ok(new_listings)
    }

    fn load(&self) -> Result<Option<Vec<Listing>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let listings = serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(listings))
    }

    fn persist(&self, listings: &[Listing]) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(listings).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Snapshot at {} replaced with {} listings", self.path.display(), listings.len());
        Ok(())
    }
}
