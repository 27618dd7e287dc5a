mod catalog;
mod error;
mod fetcher;
mod models;
mod store;

use std::env;

use anyhow::{bail, Result};
use tracing::{info, warn, Level};

use catalog::{Category, Taxonomy};
use fetcher::{ListingSource, VintedFetcher};
use models::{Listing, SearchQuery};
use store::{FavoritesStore, SnapshotStore};

const SNAPSHOT_FILE: &str = "previous_results.json";
const FAVORITES_FILE: &str = "favorites.json";
const EXPORT_FILE: &str = "search_results.json";

const DEFAULT_LIMIT: usize = 100;
const MIN_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🛍️  Deal Scout - marketplace search with new-listing alerts");

    let args: Vec<String> = env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "search" => search_command(rest).await,
        Some((cmd, rest)) if cmd == "save" => save_command(rest),
        Some((cmd, _)) if cmd == "favorites" => favorites_command(),
        Some((cmd, rest)) if cmd == "run" => run_command(rest).await,
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  deal-scout search TERM [CATEGORY] [LIMIT]   one fetch + new-listing diff");
    println!("  deal-scout save NAME TERM [CATEGORY]        save a favorite search");
    println!("  deal-scout favorites                        list saved favorites");
    println!("  deal-scout run NAME                         replay a saved favorite");
    println!();
    println!("Categories: {}", category_names().join(", "));
    println!("Limit: {MIN_LIMIT}-{MAX_LIMIT} results (default {DEFAULT_LIMIT})");
}

fn category_names() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.name()).collect()
}

fn parse_category(arg: Option<&String>) -> Result<Category> {
    match arg {
        None => Ok(Category::All),
        Some(raw) => match raw.parse() {
            Ok(category) => Ok(category),
            Err(_) => bail!(
                "unrecognized category `{}` (expected one of: {})",
                raw,
                category_names().join(", ")
            ),
        },
    }
}

fn parse_limit(arg: Option<&String>) -> Result<usize> {
    match arg {
        None => Ok(DEFAULT_LIMIT),
        Some(raw) => {
            let limit: usize = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("limit must be a number, got `{raw}`"))?;
            Ok(limit.clamp(MIN_LIMIT, MAX_LIMIT))
        }
    }
}

async fn search_command(args: &[String]) -> Result<()> {
    let Some(term) = args.first() else {
        bail!("search needs a term, e.g. `deal-scout search iphone Electronics 100`");
    };
    let category = parse_category(args.get(1))?;
    let limit = parse_limit(args.get(2))?;

    let query = SearchQuery::new(term.clone(), category);
    run_cycle(&query, limit).await
}

fn save_command(args: &[String]) -> Result<()> {
    let (Some(name), Some(term)) = (args.first(), args.get(1)) else {
        bail!("save needs a name and a term, e.g. `deal-scout save phones iphone Electronics`");
    };
    let category = parse_category(args.get(2))?;

    let favorites = FavoritesStore::new(FAVORITES_FILE);
    favorites.save(name, SearchQuery::new(term.clone(), category))?;
    info!("Saved favorite '{}' ({} / {})", name, term, category);
    Ok(())
}

fn favorites_command() -> Result<()> {
    let favorites = FavoritesStore::new(FAVORITES_FILE).load_all()?;
    if favorites.is_empty() {
        info!("No favorites saved yet");
        return Ok(());
    }

    println!("Saved searches:");
    for (name, query) in &favorites {
        println!("  {} — '{}' in {}", name, query.search, query.category);
    }
    Ok(())
}

async fn run_command(args: &[String]) -> Result<()> {
    let Some(name) = args.first() else {
        bail!("run needs a favorite name, e.g. `deal-scout run phones`");
    };

    let favorites = FavoritesStore::new(FAVORITES_FILE).load_all()?;
    let Some(query) = favorites.get(name) else {
        bail!("no favorite named `{}` (try `deal-scout favorites`)", name);
    };

    info!("Replaying favorite '{}' ('{}' in {})", name, query.search, query.category);
    run_cycle(query, DEFAULT_LIMIT).await
}

/// One blocking fetch-then-diff cycle: fetch, diff against the snapshot,
/// print both tables, export the full results.
async fn run_cycle(query: &SearchQuery, limit: usize) -> Result<()> {
    let fetcher = VintedFetcher::new(Taxonomy::default())?;
    info!(
        "Searching {} for '{}' in {} (up to {} results)",
        fetcher.source_name(),
        query.search,
        query.category,
        limit
    );

    let outcome = fetcher.search(query, limit).await;
    if let Some(err) = &outcome.error {
        warn!("Fetch ended early: {}", err);
    }
    if outcome.listings.is_empty() {
        info!("No listings found");
        return Ok(());
    }

    info!("Total listings: {}", outcome.listings.len());

    // Snapshot trouble downgrades to a warning; the full table still shows.
    match SnapshotStore::new(SNAPSHOT_FILE).detect_new(&outcome.listings) {
        Ok(new_listings) if new_listings.is_empty() => {
            info!("No new listings since last check");
        }
        Ok(new_listings) => {
            info!("🆕 New listings since last check: {}", new_listings.len());
            print_listings(&new_listings);
        }
        Err(err) => warn!("New-listing detection unavailable: {}", err),
    }

    println!("All results:");
    print_listings(&outcome.listings);

    let json = serde_json::to_string_pretty(&outcome.listings)?;
    tokio::fs::write(EXPORT_FILE, json).await?;
    info!("💾 Saved full results to {}", EXPORT_FILE);

    Ok(())
}

fn print_listings(listings: &[Listing]) {
    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({} €)", i + 1, listing.title, listing.price);
        println!("   Brand: {} | Condition: {}", listing.brand, listing.condition);
        if let Some(created) = listing.created_at {
            println!("   Listed: {}", created.format("%Y-%m-%d %H:%M"));
        }
        println!("   ID: {}", listing.id);
        println!("   URL: {}", listing.url);
        println!();
    }
}
