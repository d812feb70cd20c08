// 🏷️ Category Catalog Index - Product name → canonical category
// Verbatim lookups first, fuzzy fallback per distinct name; names that
// clear no candidate get an explicit Fallback value (presentation decides
// how to label it - "Other", "Lainnya", ...).

use crate::listing::CatalogEntry;
use crate::matcher;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical English label for the fallback category.
pub const FALLBACK_CATEGORY: &str = "Other";

// ============================================================================
// CATEGORY ASSIGNMENT
// ============================================================================

/// Resolution of one product name against the catalog.
///
/// The fallback is a variant, not a baked-in string, so presentation can
/// localize it without touching core logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CategoryAssignment {
    /// Matched a catalog entry (verbatim hits carry score 100)
    Matched { category: String, score: u8 },

    /// No candidate cleared the similarity threshold
    Fallback,
}

impl CategoryAssignment {
    pub fn is_fallback(&self) -> bool {
        matches!(self, CategoryAssignment::Fallback)
    }

    /// Resolved category name, with the canonical fallback label.
    pub fn label(&self) -> &str {
        match self {
            CategoryAssignment::Matched { category, .. } => category,
            CategoryAssignment::Fallback => FALLBACK_CATEGORY,
        }
    }
}

// ============================================================================
// CATALOG INDEX
// ============================================================================

/// Lookup structure built once from the reference catalog.
///
/// Holds both an exact-name map and the ordered name list the fuzzy
/// matcher scans, so tie-breaks follow catalog order deterministically.
pub struct CatalogIndex {
    by_name: HashMap<String, String>,
    /// Catalog names in original order (duplicates removed, first
    /// occurrence keeps its position; the mapped category is last-seen)
    names: Vec<String>,
}

impl CatalogIndex {
    /// Build the index. Duplicate catalog names resolve to the last-seen
    /// entry; the scan order keeps the first occurrence's position.
    pub fn build(entries: &[CatalogEntry]) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut names = Vec::with_capacity(entries.len());

        for entry in entries {
            if by_name
                .insert(entry.name.clone(), entry.category.clone())
                .is_none()
            {
                names.push(entry.name.clone());
            }
        }

        CatalogIndex { by_name, names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact (verbatim) category lookup.
    pub fn exact(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|c| c.as_str())
    }

    /// Resolve one product name: verbatim hit, else fuzzy best-match
    /// against the catalog names, accepted at `threshold` or above.
    pub fn assign(&self, name: &str, threshold: u8) -> CategoryAssignment {
        if let Some(category) = self.exact(name) {
            return CategoryAssignment::Matched {
                category: category.to_string(),
                score: 100,
            };
        }

        match matcher::best_match(name, &self.names) {
            Some(m) if m.score >= threshold => CategoryAssignment::Matched {
                category: self.by_name[&m.name].clone(),
                score: m.score,
            },
            _ => CategoryAssignment::Fallback,
        }
    }

    /// Assign categories to a set of distinct product names.
    ///
    /// Category is a property of the name, not the row: callers pass
    /// distinct names and apply the returned map to every Listing sharing
    /// a name. Names are matched in parallel; each name's candidate scan
    /// is sequential, so results are order-independent and deterministic.
    pub fn assign_categories(
        &self,
        names: &[String],
        threshold: u8,
    ) -> HashMap<String, CategoryAssignment> {
        names
            .par_iter()
            .map(|name| (name.clone(), self.assign(name, threshold)))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
