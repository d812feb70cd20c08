// 📦 Listing Model - One scraped observation of a product at a store
// Value-like, immutable after normalization; everything downstream is a
// pure transformation over collections of these.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Sentinel brand for listings whose product name is absent.
pub const UNKNOWN_BRAND: &str = "UNKNOWN";

// ============================================================================
// LISTING
// ============================================================================

/// One store's observation of one product on one date.
///
/// `price` and `units_sold` are `None` when the raw field had no digits;
/// display layers render a placeholder for absent fields, while all revenue
/// math substitutes 0 (a listing with units but no price contributes 0 omzet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Source store identifier (e.g., "TokoBerkah")
    pub store: String,

    /// Observation date - always present; rows without a parsable date
    /// never become Listings
    pub date: NaiveDate,

    /// Product name as scraped (free text)
    pub name: String,

    /// Price after digit-stripping, None if the raw field had no digits
    pub price: Option<i64>,

    /// Units sold per period, None if the raw field had no digits
    pub units_sold: Option<i64>,

    /// Revenue: price × units_sold, 0 if either operand is missing
    pub omzet: i64,

    /// First whitespace token of the name, or UNKNOWN_BRAND
    pub brand: String,

    /// Start of the calendar week containing `date`
    pub week_bucket: NaiveDate,
}

impl Listing {
    /// Build a listing, deriving omzet, brand and week bucket.
    pub fn new(
        store: String,
        date: NaiveDate,
        name: String,
        price: Option<i64>,
        units_sold: Option<i64>,
        week_start: Weekday,
    ) -> Self {
        let omzet = price.unwrap_or(0) * units_sold.unwrap_or(0);
        let brand = brand_of(&name);
        let week_bucket = week_bucket(date, week_start);

        Listing {
            store,
            date,
            name,
            price,
            units_sold,
            omzet,
            brand,
            week_bucket,
        }
    }

    /// True when the raw row carried a price field with digits.
    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }

    /// True when the raw row carried a units-sold field with digits.
    pub fn has_stock_data(&self) -> bool {
        self.units_sold.is_some()
    }
}

// ============================================================================
// CATALOG ENTRY
// ============================================================================

/// Reference pair from the master category catalog. Read-only; the core
/// never mutates catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub category: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        CatalogEntry {
            name: name.into(),
            category: category.into(),
        }
    }
}

// ============================================================================
// DERIVATIONS
// ============================================================================

/// First whitespace-delimited token of the product name, or the
/// UNKNOWN_BRAND sentinel when the name is empty/whitespace.
pub fn brand_of(name: &str) -> String {
    name.split_whitespace()
        .next()
        .map(|t| t.to_string())
        .unwrap_or_else(|| UNKNOWN_BRAND.to_string())
}

/// Start of the week containing `date`, for a configurable week start
/// (default Monday = ISO weeks). Walks back 0..=6 days.
pub fn week_bucket(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() as i64
        - week_start.num_days_from_monday() as i64)
        % 7;
    date - Duration::days(offset)
}

// ============================================================================
// TESTS
// ============================================================================
