pub mod favorites;
pub mod snapshot;

pub use favorites::FavoritesStore;
pub use snapshot::SnapshotStore;
