pub mod traits;
pub mod types;
pub mod vinted;

pub use traits::ListingSource;
pub use types::SearchOutcome;
pub use vinted::VintedFetcher;
