use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Marketplace category recognized by the upstream catalog.
///
/// `All` is a pseudo-category: it carries no catalog id and the upstream
/// query omits the category constraint entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    All,
    Electronics,
    Women,
    Men,
    Kids,
    Home,
    #[serde(rename = "Books & Entertainment")]
    BooksEntertainment,
    Pets,
}

impl Category {
    /// All recognized categories, in upstream display order.
    pub const ALL: [Category; 8] = [
        Category::All,
        Category::Electronics,
        Category::Women,
        Category::Men,
        Category::Kids,
        Category::Home,
        Category::BooksEntertainment,
        Category::Pets,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Electronics => "Electronics",
            Category::Women => "Women",
            Category::Men => "Men",
            Category::Kids => "Kids",
            Category::Home => "Home",
            Category::BooksEntertainment => "Books & Entertainment",
            Category::Pets => "Pets",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized names are rejected at the boundary; the resolver itself
/// only does lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized category `{}`", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Immutable upstream taxonomy, injected at startup so catalog id and
/// condition tables can be swapped without touching the fetch path.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    catalog_ids: HashMap<Category, u32>,
    conditions: HashMap<u64, String>,
}

impl Taxonomy {
    pub fn new(catalog_ids: HashMap<Category, u32>, conditions: HashMap<u64, String>) -> Self {
        Self {
            catalog_ids,
            conditions,
        }
    }

    /// Resolve a category to its upstream catalog id. `All` resolves to
    /// `None`, meaning no category filter at all.
    pub fn catalog_id(&self, category: Category) -> Option<u32> {
        self.catalog_ids.get(&category).copied()
    }

    /// Map an upstream status code to its condition label. Codes outside
    /// the table come back as "Unknown".
    pub fn condition(&self, status_id: u64) -> &str {
        self.conditions
            .get(&status_id)
            .map(String::as_str)
            .unwrap_or("Unknown")
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        let catalog_ids = HashMap::from([
            (Category::Electronics, 3),
            (Category::Women, 1904),
            (Category::Men, 1905),
            (Category::Kids, 1906),
            (Category::Home, 5),
            (Category::BooksEntertainment, 16),
            (Category::Pets, 2107),
        ]);
        let conditions = HashMap::from([
            (1, "New with tag".to_string()),
            (2, "New without tag".to_string()),
            (3, "Very good".to_string()),
            (4, "Good".to_string()),
            (5, "Satisfactory".to_string()),
        ]);
        Self::new(catalog_ids, conditions)
    }
}
