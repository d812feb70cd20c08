// 🧹 Record Normalizer - Raw scraped rows → typed Listings
// Row-level defects are recovered locally (substitution / rejection with a
// reason), never fatal to the batch.

use crate::listing::Listing;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW ROW
// ============================================================================

/// One raw scraped row: ordered (column name, raw text) pairs.
///
/// This type never crosses the normalizer boundary - everything downstream
/// works on typed Listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        RawRow { fields: Vec::new() }
    }

    pub fn set(mut self, column: &str, value: &str) -> Self {
        self.fields.push((column.to_string(), value.to_string()));
        self
    }

    /// Last value for a column (scrapers occasionally emit duplicates;
    /// last one wins, mirroring catalog duplicate resolution).
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// REJECT REPORT
// ============================================================================

/// Why a row was dropped during normalization. The date is the only
/// required field - absent optional fields are tolerated by substitution
/// (UNKNOWN brand, 0 in omzet math), never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Date column missing or unparsable with any known format
    UnparsableDate { raw: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based index within the input batch
    pub row_index: usize,
    pub reason: RejectReason,
}

/// Result of normalizing one batch from one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub source: String,
    pub listings: Vec<Listing>,
    pub rejected: Vec<RejectedRow>,
}

impl NormalizeReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} listings, {} rows rejected",
            self.source,
            self.listings.len(),
            self.rejected.len()
        )
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// Column names the normalizer understands. Scrapers map their own headers
/// onto these before handing rows over.
pub const COL_DATE: &str = "date";
pub const COL_NAME: &str = "name";
pub const COL_PRICE: &str = "price";
pub const COL_UNITS: &str = "units_sold";

/// Date formats tried in order when parsing the observation date.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

pub struct Normalizer {
    /// First day of the week used for bucketing (default: Monday, ISO)
    pub week_start: Weekday,
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer {
            week_start: Weekday::Mon,
        }
    }

    pub fn with_week_start(week_start: Weekday) -> Self {
        Normalizer { week_start }
    }

    /// Normalize a batch of raw rows from one source.
    ///
    /// Pure transform: rows that fail date parsing are rejected with a
    /// reason; missing numeric fields become `None` (0 in omzet math);
    /// a missing name yields the UNKNOWN brand sentinel downstream.
    pub fn normalize(&self, rows: &[RawRow], source: &str) -> NormalizeReport {
        let mut listings = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            match self.normalize_row(row, source) {
                Ok(listing) => listings.push(listing),
                Err(reason) => rejected.push(RejectedRow { row_index, reason }),
            }
        }

        NormalizeReport {
            source: source.to_string(),
            listings,
            rejected,
        }
    }

    fn normalize_row(&self, row: &RawRow, source: &str) -> Result<Listing, RejectReason> {
        let raw_date = row.get(COL_DATE).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| RejectReason::UnparsableDate {
            raw: raw_date.to_string(),
        })?;

        let name = row.get(COL_NAME).unwrap_or("").trim().to_string();
        let price = row.get(COL_PRICE).and_then(parse_numeric);
        let units_sold = row.get(COL_UNITS).and_then(parse_numeric);

        Ok(Listing::new(
            source.to_string(),
            date,
            name,
            price,
            units_sold,
            self.week_start,
        ))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Parse an observation date, trying each known format in order.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

/// Strip every non-digit character and parse what remains.
///
/// "Rp 15.000" → 15000, "1,200 pcs" → 1200. No digits left → None
/// (the field is absent, not zero - omzet math substitutes 0 later).
pub fn parse_numeric(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, name: &str, price: &str, units: &str) -> RawRow {
        RawRow::new()
            .set(COL_DATE, date)
            .set(COL_NAME, name)
            .set(COL_PRICE, price)
            .set(COL_UNITS, units)
    }

    #[test]
    fn test_normalize_clean_row() {
        let normalizer = Normalizer::new();
        let rows = vec![row("2025-03-12", "Indomie Goreng", "Rp 3.500", "120")];

        let report = normalizer.normalize(&rows, "TokoA");

        assert_eq!(report.rejected_count(), 0);
        assert_eq!(report.listings.len(), 1);
        let l = &report.listings[0];
        assert_eq!(l.store, "TokoA");
        assert_eq!(l.price, Some(3500));
        assert_eq!(l.units_sold, Some(120));
        assert_eq!(l.omzet, 3500 * 120);
        assert_eq!(l.brand, "Indomie");
    }

    #[test]
    fn test_unparsable_date_rejects_row_only() {
        let normalizer = Normalizer::new();
        let rows = vec![
            row("not-a-date", "Indomie Goreng", "3500", "120"),
            row("2025-03-12", "Aqua 600ml", "4000", "50"),
        ];

        let report = normalizer.normalize(&rows, "TokoA");

        assert_eq!(report.listings.len(), 1);
        assert_eq!(report.rejected_count(), 1);
        assert_eq!(report.rejected[0].row_index, 0);
        assert!(matches!(
            report.rejected[0].reason,
            RejectReason::UnparsableDate { .. }
        ));
    }

    #[test]
    fn test_missing_numeric_field_is_absent_not_zero() {
        let normalizer = Normalizer::new();
        let rows = vec![row("2025-03-12", "Indomie Goreng", "no price", "5")];

        let report = normalizer.normalize(&rows, "TokoA");

        let l = &report.listings[0];
        assert_eq!(l.price, None);
        assert_eq!(l.units_sold, Some(5));
        assert_eq!(l.omzet, 0);
    }

    #[test]
    fn test_alternate_date_formats() {
        assert_eq!(
            parse_date("12/03/2025"),
            NaiveDate::from_ymd_opt(2025, 3, 12)
        );
        assert_eq!(
            parse_date("2025-03-12"),
            NaiveDate::from_ymd_opt(2025, 3, 12)
        );
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("Maret 12"), None);
    }

    #[test]
    fn test_parse_numeric_strips_junk() {
        assert_eq!(parse_numeric("Rp 15.000"), Some(15000));
        assert_eq!(parse_numeric("1,200 pcs"), Some(1200));
        assert_eq!(parse_numeric("0"), Some(0));
        assert_eq!(parse_numeric("habis"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn test_date_only_row_tolerated_by_substitution() {
        // A valid date with every optional field absent still becomes a
        // Listing: UNKNOWN brand, absent numerics, 0 omzet.
        let normalizer = Normalizer::new();
        let rows = vec![row("2025-03-12", "", "", "")];

        let report = normalizer.normalize(&rows, "TokoA");

        assert_eq!(report.rejected_count(), 0);
        assert_eq!(report.listings.len(), 1);
        let l = &report.listings[0];
        assert_eq!(l.brand, crate::listing::UNKNOWN_BRAND);
        assert_eq!(l.price, None);
        assert_eq!(l.units_sold, None);
        assert_eq!(l.omzet, 0);
    }

    #[test]
    fn test_duplicate_column_last_wins() {
        let r = RawRow::new().set(COL_PRICE, "100").set(COL_PRICE, "200");
        assert_eq!(r.get(COL_PRICE), Some("200"));
    }
}
