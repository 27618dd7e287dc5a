use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the listing fetcher.
///
/// A network or status error aborts the remaining pagination for the
/// current action only; listings already collected are still returned.
/// A malformed record fails that record, never the batch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for page {page} failed: {reason}")]
    Network { page: u32, reason: String },

    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },

    #[error("listing record is missing required field `{0}`")]
    MalformedRecord(&'static str),
}

/// Errors from the snapshot and favorites files. Reported as warnings at
/// the action boundary; never fatal to the process.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} holds invalid data: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode data for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
