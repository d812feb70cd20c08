// Storewatch CLI - load listing/catalog CSVs, print an analysis report
// All logic lives in the library; this binary is a thin driver.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;

use storewatch::{
    aggregate_by_week, brand_distribution, detect_new_arrivals, latest_listing,
    match_across_stores, AnalysisContext, CatalogEntry, CatalogIndex, GroupBy, Normalizer,
    PriceComparison, PriceVerdict, RawRow, StoreDataset, COL_DATE, COL_NAME, COL_PRICE,
    COL_UNITS,
};

/// Similarity threshold applied to both catalog and cross-store matching.
const DEFAULT_THRESHOLD: u8 = 85;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: storewatch <listings.csv> <catalog.csv> [--json]");
        eprintln!("  listings.csv columns: store,date,name,price,units_sold");
        eprintln!("  catalog.csv columns:  name,category");
        std::process::exit(1);
    }
    let json = args.iter().any(|a| a == "--json");

    if json {
        run_json_report(Path::new(&args[1]), Path::new(&args[2]), DEFAULT_THRESHOLD)
    } else {
        run_report(Path::new(&args[1]), Path::new(&args[2]), DEFAULT_THRESHOLD)
    }
}

/// Machine-readable variant of the report: one JSON object on stdout,
/// no progress chatter, for piping into dashboards.
fn run_json_report(listings_path: &Path, catalog_path: &Path, threshold: u8) -> Result<()> {
    let ctx = build_context(listings_path, catalog_path, false)?;
    let all = ctx.all_listings();

    let index = CatalogIndex::build(&ctx.catalog);
    let mut names = Vec::new();
    for store in ctx.store_names() {
        names.extend(ctx.distinct_names(store));
    }
    names.sort();
    names.dedup();
    let categories = index.assign_categories(&names, threshold);

    let aggs = aggregate_by_week(
        &all,
        GroupBy { category: true, ..GroupBy::default() },
        Some(&categories),
    );

    let report = serde_json::json!({
        "snapshot_id": ctx.snapshot_id,
        "created_at": ctx.created_at,
        "listing_count": all.len(),
        "weekly": aggs,
        "brands": brand_distribution(&all),
        "categories": categories,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_report(listings_path: &Path, catalog_path: &Path, threshold: u8) -> Result<()> {
    println!("📊 Storewatch - storefront snapshot analysis");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load and normalize per store
    println!("\n📂 Loading listings...");
    let ctx = build_context(listings_path, catalog_path, true)?;
    let all = ctx.all_listings();
    println!("✓ Snapshot {} ({} listings)", ctx.snapshot_id, all.len());

    // 2. Category assignment over distinct names
    let index = CatalogIndex::build(&ctx.catalog);
    let mut names = Vec::new();
    for store in ctx.store_names() {
        names.extend(ctx.distinct_names(store));
    }
    names.sort();
    names.dedup();
    let categories = index.assign_categories(&names, threshold);
    let fallback_count = categories.values().filter(|a| a.is_fallback()).count();
    println!(
        "✓ Categories assigned: {} names, {} fell back",
        categories.len(),
        fallback_count
    );

    // 3. Weekly revenue per category with growth indicators
    println!("\n📈 Weekly omzet by category");
    let aggs = aggregate_by_week(
        &all,
        GroupBy { category: true, ..GroupBy::default() },
        Some(&categories),
    );
    for agg in &aggs {
        println!(
            "  {}  {:<20} omzet {:>12}  {}",
            agg.key.week,
            agg.key.category.as_deref().unwrap_or("-"),
            agg.omzet,
            agg.indicator().summary()
        );
    }

    // 4. Brand distribution
    println!("\n🏷️ Brand revenue distribution");
    for share in brand_distribution(&all).iter().take(10) {
        println!(
            "  {:<20} omzet {:>12}  {:>6.2}%",
            share.brand, share.omzet, share.share_pct
        );
    }

    // 5. Cross-store comparison for each store's most recent product
    println!("\n⚖️ Cross-store comparison");
    for store in ctx.store_names() {
        let listings = ctx.listings_for(store);
        let Some(latest) = listings.iter().max_by_key(|l| l.date) else {
            continue;
        };
        let matches = match_across_stores(&latest.name, &ctx.store_catalogs(store), threshold);
        for m in matches.iter().filter(|m| m.acceptable) {
            let Some(candidate) = &m.candidate else { continue };
            let target = ctx.listings_for(&m.store);
            let (Some(src), Some(dst)) = (
                latest.price,
                latest_listing(&target, candidate).and_then(|l| l.price),
            ) else {
                continue;
            };
            let cmp = PriceComparison::compare(src, dst);
            let direction = match cmp.verdict {
                PriceVerdict::MoreExpensive => "more expensive than",
                PriceVerdict::Cheaper => "cheaper than",
                PriceVerdict::Equal => "same price as",
            };
            println!(
                "  {} \"{}\" is {} {} \"{}\" (Δ {})",
                store, latest.name, direction, m.store, candidate, cmp.difference
            );
        }
    }

    // 6. New arrivals between the two most recent week buckets
    let mut weeks: Vec<_> = all.iter().map(|l| l.week_bucket).collect();
    weeks.sort();
    weeks.dedup();
    if weeks.len() >= 2 {
        let (prev, last) = (weeks[weeks.len() - 2], weeks[weeks.len() - 1]);
        let arrivals = detect_new_arrivals(&all, last, prev)?;
        println!("\n🆕 New arrivals in week {} vs {}", last, prev);
        for a in &arrivals {
            println!(
                "  {} @ {} (price {})",
                a.name,
                a.latest.store,
                a.latest
                    .price
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "n/a".to_string())
            );
        }
    }

    println!("\n✅ Analysis complete");
    Ok(())
}

/// Normalize every store's rows and assemble the run's context.
fn build_context(listings_path: &Path, catalog_path: &Path, verbose: bool) -> Result<AnalysisContext> {
    let raw_by_store = load_listing_rows(listings_path)?;
    let catalog = load_catalog(catalog_path)?;

    let normalizer = Normalizer::new();
    let mut stores = Vec::new();
    for (store, rows) in &raw_by_store {
        let report = normalizer.normalize(rows, store);
        if verbose {
            println!("✓ {}", report.summary());
        }
        stores.push(StoreDataset {
            store: store.clone(),
            listings: report.listings,
        });
    }
    if stores.is_empty() {
        bail!("no listings loaded from {}", listings_path.display());
    }

    Ok(AnalysisContext::new(stores, catalog))
}

/// Load raw listing rows grouped by the `store` column, store order
/// preserved as first seen in the file.
fn load_listing_rows(path: &Path) -> Result<Vec<(String, Vec<RawRow>)>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut by_store: Vec<(String, Vec<RawRow>)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut store = String::new();
        let mut row = RawRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            match header {
                "store" => store = value.to_string(),
                "date" => row = row.set(COL_DATE, value),
                "name" => row = row.set(COL_NAME, value),
                "price" => row = row.set(COL_PRICE, value),
                "units_sold" => row = row.set(COL_UNITS, value),
                _ => {}
            }
        }
        match by_store.iter_mut().find(|(s, _)| *s == store) {
            Some((_, rows)) => rows.push(row),
            None => by_store.push((store, vec![row])),
        }
    }
    Ok(by_store)
}

fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let (Some(name), Some(category)) = (record.get(0), record.get(1)) {
            entries.push(CatalogEntry::new(name, category));
        }
    }
    Ok(entries)
}
