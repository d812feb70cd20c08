// 🗂️ Analysis Context - Explicit per-run dataset snapshot
// Replaces implicit session/cache state: one immutable context is built
// per analysis run from normalizer output and passed into every core
// operation, then discarded on re-run.

use crate::cross_store::StoreCatalog;
use crate::listing::{CatalogEntry, Listing};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// STORE DATASET
// ============================================================================

/// One store's normalized listings for this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDataset {
    pub store: String,
    pub listings: Vec<Listing>,
}

// ============================================================================
// ANALYSIS CONTEXT
// ============================================================================

/// Consistent view of all loaded data at a point in time.
///
/// Created once per analysis run; all core operations read from it and
/// never mutate it. Re-running with a new threshold or window means
/// building a new context (or reusing this one - it is immutable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Unique snapshot id for this run
    pub snapshot_id: String,

    /// When this context was assembled
    pub created_at: DateTime<Utc>,

    /// Normalized listings per source store, in load order
    pub stores: Vec<StoreDataset>,

    /// Reference category catalog (read-only)
    pub catalog: Vec<CatalogEntry>,

    /// Optional inclusive date window restricting the analysis
    pub window: Option<(NaiveDate, NaiveDate)>,
}

impl AnalysisContext {
    pub fn new(stores: Vec<StoreDataset>, catalog: Vec<CatalogEntry>) -> Self {
        AnalysisContext {
            snapshot_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            stores,
            catalog,
            window: None,
        }
    }

    pub fn with_window(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.window = Some((from, to));
        self
    }

    fn in_window(&self, l: &Listing) -> bool {
        match self.window {
            Some((from, to)) => l.date >= from && l.date <= to,
            None => true,
        }
    }

    /// All listings across stores, window-filtered, in load order.
    pub fn all_listings(&self) -> Vec<Listing> {
        self.stores
            .iter()
            .flat_map(|s| s.listings.iter())
            .filter(|l| self.in_window(l))
            .cloned()
            .collect()
    }

    /// One store's listings, window-filtered.
    pub fn listings_for(&self, store: &str) -> Vec<Listing> {
        self.stores
            .iter()
            .filter(|s| s.store == store)
            .flat_map(|s| s.listings.iter())
            .filter(|l| self.in_window(l))
            .cloned()
            .collect()
    }

    /// Distinct product names for one store, first-seen order preserved
    /// (this is the deterministic tie-break order for matching).
    pub fn distinct_names(&self, store: &str) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();
        for l in self
            .stores
            .iter()
            .filter(|s| s.store == store)
            .flat_map(|s| s.listings.iter())
            .filter(|l| self.in_window(l))
        {
            if seen.insert(l.name.as_str()) {
                names.push(l.name.clone());
            }
        }
        names
    }

    /// Catalogs of every store except `exclude`, ready for cross-store
    /// matching.
    pub fn store_catalogs(&self, exclude: &str) -> Vec<StoreCatalog> {
        self.stores
            .iter()
            .filter(|s| s.store != exclude)
            .map(|s| StoreCatalog {
                store: s.store.clone(),
                names: self.distinct_names(&s.store),
            })
            .collect()
    }

    pub fn store_names(&self) -> Vec<&str> {
        self.stores.iter().map(|s| s.store.as_str()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate_by_week, GroupBy, GrowthIndicator};
    use crate::arrivals::detect_new_arrivals;
    use crate::catalog::CatalogIndex;
    use crate::cross_store::{latest_listing, match_across_stores, PriceComparison, PriceVerdict};
    use crate::normalizer::{Normalizer, RawRow, COL_DATE, COL_NAME, COL_PRICE, COL_UNITS};
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn listing(store: &str, date: NaiveDate, name: &str, price: i64, units: i64) -> Listing {
        Listing::new(
            store.to_string(),
            date,
            name.to_string(),
            Some(price),
            Some(units),
            Weekday::Mon,
        )
    }

    #[test]
    fn test_window_filtering() {
        let ctx = AnalysisContext::new(
            vec![StoreDataset {
                store: "TokoA".to_string(),
                listings: vec![
                    listing("TokoA", d(2025, 3, 1), "Lama", 100, 1),
                    listing("TokoA", d(2025, 3, 15), "Baru", 100, 1),
                ],
            }],
            vec![],
        )
        .with_window(d(2025, 3, 10), d(2025, 3, 31));

        let all = ctx.all_listings();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Baru");
        assert_eq!(ctx.distinct_names("TokoA"), vec!["Baru".to_string()]);
    }

    #[test]
    fn test_distinct_names_first_seen_order() {
        let ctx = AnalysisContext::new(
            vec![StoreDataset {
                store: "TokoA".to_string(),
                listings: vec![
                    listing("TokoA", d(2025, 3, 10), "B Produk", 100, 1),
                    listing("TokoA", d(2025, 3, 11), "A Produk", 100, 1),
                    listing("TokoA", d(2025, 3, 12), "B Produk", 100, 1),
                ],
            }],
            vec![],
        );

        assert_eq!(
            ctx.distinct_names("TokoA"),
            vec!["B Produk".to_string(), "A Produk".to_string()]
        );
    }

    #[test]
    fn test_store_catalogs_exclude_source() {
        let ctx = AnalysisContext::new(
            vec![
                StoreDataset {
                    store: "TokoA".to_string(),
                    listings: vec![listing("TokoA", d(2025, 3, 10), "X", 100, 1)],
                },
                StoreDataset {
                    store: "TokoB".to_string(),
                    listings: vec![listing("TokoB", d(2025, 3, 10), "Y", 100, 1)],
                },
            ],
            vec![],
        );

        let catalogs = ctx.store_catalogs("TokoA");
        assert_eq!(catalogs.len(), 1);
        assert_eq!(catalogs[0].store, "TokoB");
        assert_eq!(catalogs[0].names, vec!["Y".to_string()]);
    }

    // ------------------------------------------------------------------
    // End-to-end: two stores, three weeks, one product carried in store A
    // throughout and appearing in store B (under a name variant) from
    // week 2. Raw rows go through the normalizer exactly as the ingestion
    // layer would hand them over.
    // ------------------------------------------------------------------

    fn raw(date: &str, name: &str, price: &str, units: &str) -> RawRow {
        RawRow::new()
            .set(COL_DATE, date)
            .set(COL_NAME, name)
            .set(COL_PRICE, price)
            .set(COL_UNITS, units)
    }

    #[test]
    fn test_end_to_end_two_stores_three_weeks() {
        let normalizer = Normalizer::new();

        // Store A: weeks of 2025-03-03, 03-10, 03-17
        let rows_a = vec![
            raw("2025-03-04", "Kopi Kapal Api Special 165g", "Rp 12.000", "40"),
            raw("2025-03-11", "Kopi Kapal Api Special 165g", "Rp 12.000", "60"),
            raw("2025-03-18", "Kopi Kapal Api Special 165g", "Rp 12.500", "90"),
            raw("bad date", "Kopi Kapal Api Special 165g", "Rp 12.000", "10"),
        ];
        // Store B: same product under a reordered name, weeks 2-3 only
        let rows_b = vec![
            raw("2025-03-12", "Kapal Api Kopi Special 165g", "Rp 11.500", "30"),
            raw("2025-03-19", "Kapal Api Kopi Special 165g", "Rp 11.000", "45"),
        ];

        let report_a = normalizer.normalize(&rows_a, "TokoA");
        let report_b = normalizer.normalize(&rows_b, "TokoB");
        assert_eq!(report_a.rejected_count(), 1);
        assert_eq!(report_b.rejected_count(), 0);

        let catalog = vec![CatalogEntry::new(
            "Kopi Kapal Api Special 165g",
            "Kopi & Teh",
        )];

        let ctx = AnalysisContext::new(
            vec![
                StoreDataset {
                    store: "TokoA".to_string(),
                    listings: report_a.listings,
                },
                StoreDataset {
                    store: "TokoB".to_string(),
                    listings: report_b.listings,
                },
            ],
            catalog,
        );

        // Category assignment: verbatim for A's name, fuzzy (permutation
        // scores 100 ≥ 85) for B's variant.
        let index = CatalogIndex::build(&ctx.catalog);
        let mut names = ctx.distinct_names("TokoA");
        names.extend(ctx.distinct_names("TokoB"));
        let categories = index.assign_categories(&names, 85);
        assert!(categories.values().all(|a| a.label() == "Kopi & Teh"));

        // Cross-store match from A's perspective: accepted in B.
        let matches = match_across_stores(
            "Kopi Kapal Api Special 165g",
            &ctx.store_catalogs("TokoA"),
            85,
        );
        assert_eq!(matches.len(), 1);
        assert!(matches[0].acceptable);
        assert_eq!(
            matches[0].candidate.as_deref(),
            Some("Kapal Api Kopi Special 165g")
        );

        // Price comparison on most recent rows: A 12500 vs B 11000.
        let a_latest =
            latest_listing(&ctx.listings_for("TokoA"), "Kopi Kapal Api Special 165g")
                .unwrap()
                .price
                .unwrap();
        let b_latest =
            latest_listing(&ctx.listings_for("TokoB"), "Kapal Api Kopi Special 165g")
                .unwrap()
                .price
                .unwrap();
        let cmp = PriceComparison::compare(a_latest, b_latest);
        assert_eq!(cmp.difference, 1500);
        assert_eq!(cmp.verdict, PriceVerdict::MoreExpensive);

        // Weekly aggregation over everything: three buckets, growth from
        // week 2 onward.
        let aggs = aggregate_by_week(&ctx.all_listings(), GroupBy::week_only(), None);
        assert_eq!(aggs.len(), 3);
        assert_eq!(aggs[0].growth_pct, None);
        assert!(matches!(aggs[1].indicator(), GrowthIndicator::Positive(_)));

        // New arrivals week 2 vs week 1: B's name variant appears.
        let arrivals =
            detect_new_arrivals(&ctx.all_listings(), d(2025, 3, 10), d(2025, 3, 3)).unwrap();
        let names: Vec<&str> = arrivals.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Kapal Api Kopi Special 165g"]);
        assert_eq!(arrivals[0].latest.store, "TokoB");
    }
}
