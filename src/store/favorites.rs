use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::StoreError;
use crate::models::SearchQuery;

/// Named saved searches, persisted as a `{name: query}` JSON document.
///
/// Saves are load-merge-rewrite: the whole file is rewritten on every
/// save, and a name collision overwrites the earlier entry. There is no
/// delete operation.
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Upsert one favorite by name. Last write wins.
    pub fn save(&self, name: &str, query: SearchQuery) -> Result<(), StoreError> {
        let mut favorites = self.load_all()?;
        favorites.insert(name.to_string(), query);

        let json =
            serde_json::to_string_pretty(&favorites).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved favorite '{}' ({} total)", name, favorites.len());
        Ok(())
    }

    /// All saved favorites, keyed by name. An absent file is an empty set.
    pub fn load_all(&self) -> Result<BTreeMap<String, SearchQuery>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    fn store_in(dir: &tempfile::TempDir) -> FavoritesStore {
        FavoritesStore::new(dir.path().join("favorites.json"))
    }

    #[test]
    fn absent_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn saved_favorites_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let query = SearchQuery::new("iphone", Category::Electronics);

        store.save("phones", query.clone()).unwrap();

        let favorites = store.load_all().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites["phones"], query);
    }

    #[test]
    fn last_write_wins_for_the_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save("x", SearchQuery::new("iphone", Category::Electronics))
            .unwrap();
        let replacement = SearchQuery::new("dog bed", Category::Pets);
        store.save("x", replacement.clone()).unwrap();

        let favorites = store.load_all().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites["x"], replacement);
    }

    #[test]
    fn saves_under_different_names_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save("a", SearchQuery::new("iphone", Category::Electronics))
            .unwrap();
        store
            .save("b", SearchQuery::new("lego", Category::Kids))
            .unwrap();

        let favorites = store.load_all().unwrap();
        assert_eq!(favorites.len(), 2);
    }

    #[test]
    fn category_names_persist_in_display_form() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save("comics", SearchQuery::new("tintin", Category::BooksEntertainment))
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("favorites.json")).unwrap();
        assert!(raw.contains("Books & Entertainment"));
    }
}
