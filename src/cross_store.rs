// ⚖️ Cross-Store Matcher - Same product, different storefronts
// Finds the best name match per target store independently; an accepted
// match resolves the target's most recent listing for price comparison.
// Sign convention: difference = source price − target price.

use crate::listing::Listing;
use crate::matcher;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// STORE CATALOG
// ============================================================================

/// Distinct product names currently available in one target store,
/// already date-filtered to the analysis window. Name order is the
/// deterministic tie-break order for fuzzy matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCatalog {
    pub store: String,
    pub names: Vec<String>,
}

// ============================================================================
// MATCH RESULT
// ============================================================================

/// Best candidate for one (source product, target store) pair.
/// At most one per target store - only the best-scoring name is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMatch {
    pub store: String,

    /// Best-scoring candidate name in the target store, None when the
    /// store's catalog is empty
    pub candidate: Option<String>,

    /// Similarity score 0-100 (0 when no candidate exists)
    pub score: u8,

    /// score ≥ threshold
    pub acceptable: bool,
}

impl StoreMatch {
    fn no_candidates(store: String) -> Self {
        StoreMatch {
            store,
            candidate: None,
            score: 0,
            acceptable: false,
        }
    }
}

/// One StoreMatch per target store. Stores run independently and in
/// parallel - a product may match in store A and miss in store B.
pub fn match_across_stores(
    product_name: &str,
    targets: &[StoreCatalog],
    threshold: u8,
) -> Vec<StoreMatch> {
    targets
        .par_iter()
        .map(|target| match matcher::best_match(product_name, &target.names) {
            Some(m) => StoreMatch {
                store: target.store.clone(),
                acceptable: m.score >= threshold,
                score: m.score,
                candidate: Some(m.name),
            },
            None => StoreMatch::no_candidates(target.store.clone()),
        })
        .collect()
}

/// Most recent listing for `name` within one store's listings.
///
/// Ties on date resolve to the later row in input order (scrape order),
/// so repeated runs pick the same row.
pub fn latest_listing<'a>(listings: &'a [Listing], name: &str) -> Option<&'a Listing> {
    listings
        .iter()
        .filter(|l| l.name == name)
        .fold(None, |best: Option<&Listing>, l| match best {
            Some(b) if b.date > l.date => Some(b),
            _ => Some(l),
        })
}

// ============================================================================
// PRICE COMPARISON
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PriceVerdict {
    /// Source store charges more than the target
    MoreExpensive,
    /// Source store charges less than the target
    Cheaper,
    Equal,
}

/// Signed price comparison between the source store's and a target
/// store's most recent price for "the same" product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub source_price: i64,
    pub target_price: i64,

    /// source − target; positive means source is more expensive.
    /// Consumers render direction from this sign - preserve it exactly.
    pub difference: i64,

    pub verdict: PriceVerdict,
}

impl PriceComparison {
    pub fn compare(source_price: i64, target_price: i64) -> Self {
        let difference = source_price - target_price;
        let verdict = if difference > 0 {
            PriceVerdict::MoreExpensive
        } else if difference < 0 {
            PriceVerdict::Cheaper
        } else {
            PriceVerdict::Equal
        };

        PriceComparison {
            source_price,
            target_price,
            difference,
            verdict,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
