use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Taxonomy;
use crate::error::FetchError;
use crate::fetcher::traits::ListingSource;
use crate::fetcher::types::SearchOutcome;
use crate::models::{Listing, SearchQuery};

/// Fixed upstream page size; pagination math is built around it.
pub const PAGE_SIZE: usize = 50;

const BASE_URL: &str = "https://www.vinted.fr";
const SEARCH_PATH: &str = "/api/v2/catalog/items";
const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Value>,
}

/// One page of raw upstream records, behind a seam so pagination and
/// normalization can be exercised without a live endpoint.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        search_text: &str,
        catalog_id: Option<u32>,
        page: u32,
    ) -> Result<Vec<Value>, FetchError>;
}

/// reqwest-backed page source for the Vinted catalog search endpoint.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(
        &self,
        search_text: &str,
        catalog_id: Option<u32>,
        page: u32,
    ) -> Result<Vec<Value>, FetchError> {
        let mut params = vec![
            ("search_text", search_text.to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];
        // "All" carries no catalog id; the constraint is omitted entirely.
        if let Some(id) = catalog_id {
            params.push(("catalog_ids", id.to_string()));
        }

        let url = format!("{BASE_URL}{SEARCH_PATH}");
        debug!("Fetching page {} of {}", page, url);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                page,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                page,
                status: response.status().as_u16(),
            });
        }

        let body: SearchResponse =
            response.json().await.map_err(|e| FetchError::Network {
                page,
                reason: e.to_string(),
            })?;

        Ok(body.items)
    }
}

/// Paginated Vinted search client producing normalized listings.
pub struct VintedFetcher {
    pages: Box<dyn PageSource>,
    taxonomy: Taxonomy,
}

impl VintedFetcher {
    pub fn new(taxonomy: Taxonomy) -> Result<Self> {
        Ok(Self {
            pages: Box::new(HttpPageSource::new()?),
            taxonomy,
        })
    }

    /// Build a fetcher over a custom page source.
    pub fn with_source(pages: Box<dyn PageSource>, taxonomy: Taxonomy) -> Self {
        Self { pages, taxonomy }
    }
}

#[async_trait]
impl ListingSource for VintedFetcher {
    async fn search(&self, query: &SearchQuery, limit: usize) -> SearchOutcome {
        // Over-fetches by up to one page; the per-record cap below stops
        // the walk once `limit` listings are collected.
        let pages = (limit / PAGE_SIZE) as u32 + 1;
        let catalog_id = self.taxonomy.catalog_id(query.category);

        let mut listings = Vec::new();

        'pages: for page in 1..=pages {
            let items = match self
                .pages
                .fetch_page(&query.search, catalog_id, page)
                .await
            {
                Ok(items) => items,
                Err(err) => {
                    // Keep what the earlier pages produced.
                    warn!("Search for '{}' stopped early: {}", query.search, err);
                    return SearchOutcome::interrupted(listings, err);
                }
            };

            if items.is_empty() {
                debug!("Page {} empty, upstream exhausted", page);
                break;
            }

            for item in &items {
                match normalize_item(item, &self.taxonomy) {
                    Ok(listing) => listings.push(listing),
                    Err(err) => warn!("Skipping record on page {}: {}", page, err),
                }
                if listings.len() >= limit {
                    break 'pages;
                }
            }
        }

        SearchOutcome::complete(listings)
    }

    fn source_name(&self) -> &'static str {
        "Vinted"
    }
}

/// Normalize one raw upstream record into a [`Listing`].
///
/// `id`, `title`, `price` and `url` are required; their absence fails the
/// record. Brand and condition fall back to "Unknown", and a bad
/// `created_at` becomes `None` rather than failing the record.
fn normalize_item(item: &Value, taxonomy: &Taxonomy) -> Result<Listing, FetchError> {
    let id = item
        .get("id")
        .and_then(Value::as_u64)
        .ok_or(FetchError::MalformedRecord("id"))?;

    let title = item
        .get("title")
        .and_then(Value::as_str)
        .ok_or(FetchError::MalformedRecord("title"))?
        .to_string();

    let price = match item.get("price") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(FetchError::MalformedRecord("price")),
    };

    let brand = item
        .pointer("/brand/title")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();

    let condition = item
        .get("status_id")
        .and_then(Value::as_u64)
        .map(|code| taxonomy.condition(code).to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let path = item
        .get("url")
        .and_then(Value::as_str)
        .ok_or(FetchError::MalformedRecord("url"))?;
    let url = if path.starts_with("http") {
        path.to_string()
    } else {
        format!("{BASE_URL}{path}")
    };

    let created_at = item
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.with_timezone(&Utc));

    Ok(Listing {
        id,
        title,
        price,
        brand,
        condition,
        url,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::catalog::Category;

    /// Canned pages plus a log of which page numbers were requested.
    struct FakePages {
        pages: Vec<Result<Vec<Value>, FetchError>>,
        requested: Mutex<Vec<u32>>,
    }

    impl FakePages {
        fn new(pages: Vec<Result<Vec<Value>, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                requested: Mutex::new(Vec::new()),
            })
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for Arc<FakePages> {
        async fn fetch_page(
            &self,
            _search_text: &str,
            _catalog_id: Option<u32>,
            page: u32,
        ) -> Result<Vec<Value>, FetchError> {
            self.requested.lock().unwrap().push(page);
            match self.pages.get(page as usize - 1) {
                Some(Ok(items)) => Ok(items.clone()),
                Some(Err(FetchError::Network { page, reason })) => Err(FetchError::Network {
                    page: *page,
                    reason: reason.clone(),
                }),
                Some(Err(FetchError::Status { page, status })) => Err(FetchError::Status {
                    page: *page,
                    status: *status,
                }),
                Some(Err(FetchError::MalformedRecord(f))) => Err(FetchError::MalformedRecord(f)),
                None => Ok(Vec::new()),
            }
        }
    }

    fn raw_item(id: u64) -> Value {
        json!({
            "id": id,
            "title": format!("Item {id}"),
            "price": "12.5",
            "brand": {"title": "Acme"},
            "status_id": 3,
            "url": format!("/items/{id}"),
            "created_at": "2024-03-01T10:00:00+01:00",
        })
    }

    fn page_of(ids: std::ops::Range<u64>) -> Vec<Value> {
        ids.map(raw_item).collect()
    }

    fn fetcher(pages: Vec<Result<Vec<Value>, FetchError>>) -> (VintedFetcher, Arc<FakePages>) {
        let source = FakePages::new(pages);
        let fetcher =
            VintedFetcher::with_source(Box::new(Arc::clone(&source)), Taxonomy::default());
        (fetcher, source)
    }

    fn query(category: Category) -> SearchQuery {
        SearchQuery::new("iphone", category)
    }

    #[tokio::test]
    async fn returns_at_most_limit_records() {
        let (fetcher, _) = fetcher(vec![
            Ok(page_of(0..50)),
            Ok(page_of(50..100)),
            Ok(page_of(100..150)),
        ]);

        let outcome = fetcher.search(&query(Category::All), 120).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.listings.len(), 120);
        assert_eq!(outcome.listings[0].id, 0);
        assert_eq!(outcome.listings[119].id, 119);
    }

    #[tokio::test]
    async fn issues_limit_over_page_size_plus_one_pages() {
        let (fetcher, pages) = fetcher(vec![
            Ok(page_of(0..50)),
            Ok(page_of(50..100)),
            Ok(page_of(100..150)),
        ]);

        let outcome = fetcher.search(&query(Category::All), 100).await;

        assert_eq!(outcome.listings.len(), 100);
        // 100 / 50 + 1 = 3 pages planned, but the per-record cap fires on
        // the last record of page 2 before page 3 is requested.
        assert_eq!(pages.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn stops_when_upstream_is_exhausted() {
        let (fetcher, _) = fetcher(vec![Ok(page_of(0..30)), Ok(Vec::new())]);

        let outcome = fetcher.search(&query(Category::All), 100).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.listings.len(), 30);
    }

    #[tokio::test]
    async fn network_error_keeps_earlier_pages() {
        let (fetcher, _) = fetcher(vec![
            Ok(page_of(0..50)),
            Err(FetchError::Network {
                page: 2,
                reason: "connection reset".to_string(),
            }),
            Ok(page_of(100..150)),
        ]);

        let outcome = fetcher.search(&query(Category::All), 150).await;

        assert!(!outcome.is_complete());
        assert_eq!(outcome.listings.len(), 50);
        assert!(matches!(
            outcome.error,
            Some(FetchError::Network { page: 2, .. })
        ));
    }

    #[tokio::test]
    async fn non_success_status_aborts_pagination() {
        let (fetcher, pages) = fetcher(vec![
            Err(FetchError::Status {
                page: 1,
                status: 429,
            }),
            Ok(page_of(0..50)),
        ]);

        let outcome = fetcher.search(&query(Category::All), 100).await;

        assert!(outcome.listings.is_empty());
        assert!(matches!(
            outcome.error,
            Some(FetchError::Status { page: 1, status: 429 })
        ));
        assert_eq!(pages.requested(), vec![1]);
    }

    #[tokio::test]
    async fn malformed_records_are_skipped_not_fatal() {
        let page = vec![
            raw_item(1),
            json!({"title": "no id", "price": "1.0", "url": "/x"}),
            raw_item(2),
        ];
        let (fetcher, _) = fetcher(vec![Ok(page)]);

        let outcome = fetcher.search(&query(Category::All), 50).await;

        assert!(outcome.is_complete());
        let ids: Vec<u64> = outcome.listings.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn missing_brand_and_bad_status_normalize_to_unknown() {
        let taxonomy = Taxonomy::default();
        let item = json!({
            "id": 7,
            "title": "Mystery",
            "price": 9.99,
            "status_id": 0,
            "url": "/items/7",
        });

        let listing = normalize_item(&item, &taxonomy).unwrap();

        assert_eq!(listing.brand, "Unknown");
        assert_eq!(listing.condition, "Unknown");
        assert_eq!(listing.price, "9.99");
        assert_eq!(listing.url, "https://www.vinted.fr/items/7");
    }

    #[test]
    fn missing_status_id_normalizes_to_unknown() {
        let taxonomy = Taxonomy::default();
        let item = json!({
            "id": 8,
            "title": "No status",
            "price": "4.0",
            "url": "/items/8",
        });

        let listing = normalize_item(&item, &taxonomy).unwrap();
        assert_eq!(listing.condition, "Unknown");
    }

    #[test]
    fn bad_created_at_does_not_fail_the_record() {
        let taxonomy = Taxonomy::default();
        let item = json!({
            "id": 9,
            "title": "Old",
            "price": "2.0",
            "url": "/items/9",
            "created_at": "not-a-timestamp",
        });

        let listing = normalize_item(&item, &taxonomy).unwrap();
        assert!(listing.created_at.is_none());
    }

    #[test]
    fn missing_required_field_fails_the_record() {
        let taxonomy = Taxonomy::default();
        let item = json!({"id": 10, "title": "No price", "url": "/items/10"});

        let err = normalize_item(&item, &taxonomy).unwrap_err();
        assert!(matches!(err, FetchError::MalformedRecord("price")));
    }

    #[tokio::test]
    async fn valid_created_at_is_parsed_to_utc() {
        let (fetcher, _) = fetcher(vec![Ok(vec![raw_item(1)])]);

        let outcome = fetcher.search(&query(Category::Electronics), 50).await;

        let created = outcome.listings[0].created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-03-01T09:00:00+00:00");
    }
}
