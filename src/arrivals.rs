// 🆕 New-Arrival Detector - Products present in one week, absent in another
// Pure set difference over distinct product names between two week
// buckets; identical buckets are a rejected precondition, not an empty
// result.

use crate::listing::Listing;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// NEW ARRIVAL
// ============================================================================

/// A product name seen in the target week but not the comparison week,
/// with the most recent in-week row for price/brand/store at arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArrival {
    pub name: String,
    pub latest: Listing,
}

// ============================================================================
// DETECTOR
// ============================================================================

/// Distinct product names present in `target_week` but absent from
/// `comparison_week`, sorted by name for reproducible output.
///
/// Identical week buckets are rejected - the difference would be
/// trivially empty and meaningless.
pub fn detect_new_arrivals(
    listings: &[Listing],
    target_week: NaiveDate,
    comparison_week: NaiveDate,
) -> Result<Vec<NewArrival>> {
    if target_week == comparison_week {
        bail!(
            "cannot compare week {} against itself",
            target_week
        );
    }

    let comparison_names: HashSet<&str> = listings
        .iter()
        .filter(|l| l.week_bucket == comparison_week)
        .map(|l| l.name.as_str())
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut arrivals = Vec::new();

    for l in listings.iter().filter(|l| l.week_bucket == target_week) {
        if comparison_names.contains(l.name.as_str()) || !seen.insert(l.name.as_str()) {
            continue;
        }
        // The name was drawn from this week, so a latest row always exists.
        if let Some(latest) = latest_in_week(listings, &l.name, target_week) {
            arrivals.push(NewArrival {
                name: l.name.clone(),
                latest,
            });
        }
    }

    arrivals.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(arrivals)
}

/// Most recent row for `name` within `week`.
fn latest_in_week(listings: &[Listing], name: &str, week: NaiveDate) -> Option<Listing> {
    listings
        .iter()
        .filter(|l| l.week_bucket == week && l.name == name)
        .max_by_key(|l| l.date)
        .cloned()
}

// ============================================================================
// TESTS
// ============================================================================
