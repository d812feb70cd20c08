// Storewatch - Record-linkage and temporal-aggregation engine
// Turns periodic storefront snapshots into comparable, deduplicated
// business metrics. Exposes all modules for use in the CLI and tests.

pub mod listing;
pub mod normalizer;
pub mod matcher;
pub mod catalog;
pub mod cross_store;
pub mod aggregate;
pub mod arrivals;
pub mod context;

// Re-export commonly used types
pub use listing::{brand_of, week_bucket, CatalogEntry, Listing, UNKNOWN_BRAND};
pub use normalizer::{
    NormalizeReport, Normalizer, RawRow, RejectReason, RejectedRow,
    COL_DATE, COL_NAME, COL_PRICE, COL_UNITS,
};
pub use matcher::{best_match, similarity, MatchCandidate};
pub use catalog::{CatalogIndex, CategoryAssignment, FALLBACK_CATEGORY};
pub use cross_store::{
    latest_listing, match_across_stores, PriceComparison, PriceVerdict, StoreCatalog,
    StoreMatch,
};
pub use aggregate::{
    aggregate_by_week, brand_distribution, growth_pct, AggregateKey, BrandShare, GroupBy,
    GrowthIndicator, ProductHistoryIndex, WeeklyAggregate,
};
pub use arrivals::{detect_new_arrivals, NewArrival};
pub use context::{AnalysisContext, StoreDataset};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
