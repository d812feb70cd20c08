// 📊 Temporal Aggregator - Week buckets, growth, brand distribution
// Two deliberately distinct growth computations live here:
//   1. aggregate bucket growth: calendar week vs the chronologically
//      preceding bucket with the same non-week key (per-period totals)
//   2. product momentum: trailing 7 days vs the prior 7 days, anchored at
//      the product's most recent observation (per-product momentum)
// Division by zero is defined away as "undefined growth", never an error.

use crate::catalog::{CategoryAssignment, FALLBACK_CATEGORY};
use crate::listing::Listing;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// GROWTH
// ============================================================================

/// (curr − prev) / prev × 100, undefined when the prior sum is 0.
pub fn growth_pct(prev: i64, curr: i64) -> Option<f64> {
    if prev == 0 {
        return None;
    }
    Some((curr - prev) as f64 / prev as f64 * 100.0)
}

/// Classification of a nullable growth percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GrowthIndicator {
    /// Undefined (no prior period, or prior sum was 0) or exactly 0
    Neutral,

    /// Positive growth, magnitude in percent
    Positive(f64),

    /// Negative growth, magnitude in percent (absolute value)
    Negative(f64),
}

impl GrowthIndicator {
    pub fn classify(growth: Option<f64>) -> Self {
        match growth {
            None => GrowthIndicator::Neutral,
            Some(g) if g > 0.0 => GrowthIndicator::Positive(g),
            Some(g) if g < 0.0 => GrowthIndicator::Negative(g.abs()),
            Some(_) => GrowthIndicator::Neutral,
        }
    }

    /// Short rendering for reports: "▲ 50.00%", "▼ 12.50%", "—".
    pub fn summary(&self) -> String {
        match self {
            GrowthIndicator::Neutral => "—".to_string(),
            GrowthIndicator::Positive(m) => format!("▲ {:.2}%", m),
            GrowthIndicator::Negative(m) => format!("▼ {:.2}%", m),
        }
    }
}

// ============================================================================
// WEEKLY AGGREGATES
// ============================================================================

/// Which non-week fields participate in the grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    pub store: bool,
    pub category: bool,
    pub brand: bool,
}

impl GroupBy {
    /// Week bucket alone.
    pub fn week_only() -> Self {
        GroupBy::default()
    }
}

/// Grouping key: week bucket plus the selected non-week fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateKey {
    pub week: NaiveDate,
    pub store: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
}

/// Summed omzet/units for one grouping key, with growth relative to the
/// preceding week bucket in the same non-week group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    pub key: AggregateKey,
    pub omzet: i64,
    pub units: i64,

    /// None when no preceding bucket exists or its omzet was 0
    pub growth_pct: Option<f64>,
}

impl WeeklyAggregate {
    pub fn indicator(&self) -> GrowthIndicator {
        GrowthIndicator::classify(self.growth_pct)
    }
}

/// Group listings by week bucket (plus selected fields), sum omzet and
/// units, and derive week-over-week growth.
///
/// `categories` is consulted only when `group_by.category` is set; names
/// missing from the map land in the fallback category. Output is sorted
/// by (store, category, brand, week) so each non-week group is a
/// contiguous, chronologically ordered run. Sums are plain additions, so
/// partial aggregates from parallel shards merge safely upstream.
pub fn aggregate_by_week(
    listings: &[Listing],
    group_by: GroupBy,
    categories: Option<&HashMap<String, CategoryAssignment>>,
) -> Vec<WeeklyAggregate> {
    let mut sums: HashMap<AggregateKey, (i64, i64)> = HashMap::new();

    for l in listings {
        let category = if group_by.category {
            let label = categories
                .and_then(|map| map.get(&l.name))
                .map(|a| a.label())
                .unwrap_or(FALLBACK_CATEGORY);
            Some(label.to_string())
        } else {
            None
        };

        let key = AggregateKey {
            week: l.week_bucket,
            store: group_by.store.then(|| l.store.clone()),
            category,
            brand: group_by.brand.then(|| l.brand.clone()),
        };

        let entry = sums.entry(key).or_insert((0, 0));
        entry.0 += l.omzet;
        entry.1 += l.units_sold.unwrap_or(0);
    }

    let mut aggregates: Vec<WeeklyAggregate> = sums
        .into_iter()
        .map(|(key, (omzet, units))| WeeklyAggregate {
            key,
            omzet,
            units,
            growth_pct: None,
        })
        .collect();

    // Contiguous non-week groups, weeks ascending within each.
    aggregates.sort_by(|a, b| {
        (&a.key.store, &a.key.category, &a.key.brand, a.key.week)
            .cmp(&(&b.key.store, &b.key.category, &b.key.brand, b.key.week))
    });

    for i in 1..aggregates.len() {
        let (prev, curr) = {
            let (left, right) = aggregates.split_at_mut(i);
            (&left[i - 1], &mut right[0])
        };
        let same_group = prev.key.store == curr.key.store
            && prev.key.category == curr.key.category
            && prev.key.brand == curr.key.brand;
        if same_group {
            curr.growth_pct = growth_pct(prev.omzet, curr.omzet);
        }
    }

    aggregates
}

// ============================================================================
// PRODUCT MOMENTUM (rolling 7-day windows)
// ============================================================================

/// Precomputed per-product omzet series, date-sorted, replacing row-wise
/// rescans: built once, queried by binary search per product.
pub struct ProductHistoryIndex {
    series: HashMap<String, Vec<(NaiveDate, i64)>>,
}

impl ProductHistoryIndex {
    pub fn build(listings: &[Listing]) -> Self {
        let mut series: HashMap<String, Vec<(NaiveDate, i64)>> = HashMap::new();
        for l in listings {
            series
                .entry(l.name.clone())
                .or_default()
                .push((l.date, l.omzet));
        }
        for points in series.values_mut() {
            points.sort_by_key(|(date, _)| *date);
        }
        ProductHistoryIndex { series }
    }

    /// Summed omzet for observations in `[from, to]`.
    fn window_sum(points: &[(NaiveDate, i64)], from: NaiveDate, to: NaiveDate) -> i64 {
        let lo = points.partition_point(|(date, _)| *date < from);
        let hi = points.partition_point(|(date, _)| *date <= to);
        points[lo..hi].iter().map(|(_, omzet)| omzet).sum()
    }

    /// Week-over-week momentum for one product: omzet in the trailing 7
    /// days ending at its most recent observation vs the prior 7-day
    /// window. None when the product is unknown or the prior window sums
    /// to 0 (undefined growth).
    pub fn momentum(&self, name: &str) -> Option<f64> {
        let points = self.series.get(name)?;
        let latest = points.last()?.0;

        let curr_from = latest - Duration::days(6);
        let prev_to = curr_from - Duration::days(1);
        let prev_from = prev_to - Duration::days(6);

        let curr = Self::window_sum(points, curr_from, latest);
        let prev = Self::window_sum(points, prev_from, prev_to);

        growth_pct(prev, curr)
    }

    /// Most recent observation date for a product.
    pub fn latest_date(&self, name: &str) -> Option<NaiveDate> {
        self.series.get(name).and_then(|p| p.last()).map(|(d, _)| *d)
    }
}

// ============================================================================
// BRAND DISTRIBUTION
// ============================================================================

/// One brand's share of total omzet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandShare {
    pub brand: String,
    pub omzet: i64,

    /// Percentage of the batch total; 0 when the total is 0
    pub share_pct: f64,
}

/// Total omzet per brand with share-of-total, descending by omzet.
/// Ties sort by brand name so output order is reproducible.
pub fn brand_distribution(listings: &[Listing]) -> Vec<BrandShare> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for l in listings {
        *totals.entry(l.brand.clone()).or_insert(0) += l.omzet;
    }

    let grand_total: i64 = totals.values().sum();

    let mut shares: Vec<BrandShare> = totals
        .into_iter()
        .map(|(brand, omzet)| BrandShare {
            brand,
            omzet,
            share_pct: if grand_total == 0 {
                0.0
            } else {
                omzet as f64 / grand_total as f64 * 100.0
            },
        })
        .collect();

    shares.sort_by(|a, b| b.omzet.cmp(&a.omzet).then(a.brand.cmp(&b.brand)));
    shares
}

// ============================================================================
// TESTS
// ============================================================================
