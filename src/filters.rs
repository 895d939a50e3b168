// Filter Engine - predicate sets composed over immutable catalog views
//
// The sidebar multi-selects and the tab-local search/threshold are one value
// type, FilterSet, passed between layers instead of shared widget state. All
// predicates AND together; a disabled predicate matches everything. Applying
// a set derives a new view; the base table is never touched.

use crate::catalog::{Catalog, CompanyRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// FILTER SET
// ============================================================================

/// The active filter criteria. Empty set / empty string / zero threshold
/// means that predicate is disabled, with no hidden defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    /// Keep records whose `fuel_source` is in the set; empty = disabled
    pub fuel_sources: HashSet<String>,

    /// Keep records whose `general_approach` is in the set; empty = disabled
    pub approaches: HashSet<String>,

    /// Case-insensitive substring over name OR description; empty = disabled
    pub search_term: String,

    /// Keep records with funding >= this; 0.0 = disabled. Records with
    /// absent funding cannot satisfy an enabled threshold.
    pub min_funding_usd: f64,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: restrict fuel sources
    pub fn with_fuel_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fuel_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: restrict general approaches
    pub fn with_approaches<I, S>(mut self, approaches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.approaches = approaches.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: free-text search
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Builder: minimum funding threshold in USD
    pub fn with_min_funding_usd(mut self, min: f64) -> Self {
        self.min_funding_usd = min;
        self
    }

    /// Whether any predicate is enabled
    pub fn is_active(&self) -> bool {
        !self.fuel_sources.is_empty()
            || !self.approaches.is_empty()
            || !self.search_term.trim().is_empty()
            || self.min_funding_usd > 0.0
    }

    /// Does one record survive every enabled predicate?
    pub fn matches(&self, record: &CompanyRecord) -> bool {
        if !self.fuel_sources.is_empty() && !self.fuel_sources.contains(&record.fuel_source) {
            return false;
        }

        if !self.approaches.is_empty() && !self.approaches.contains(&record.general_approach) {
            return false;
        }

        let term = self.search_term.trim();
        if !term.is_empty() && !record.matches_search(term) {
            return false;
        }

        if self.min_funding_usd > 0.0 {
            match record.funding_usd {
                Some(funding) if funding >= self.min_funding_usd => {}
                _ => return false,
            }
        }

        true
    }
}

// ============================================================================
// CATALOG VIEW
// ============================================================================

/// Read-only, ordered subset of the catalog.
///
/// Borrows the base records; refining produces another view in the same
/// lifetime. An empty view is a valid state, distinguishable from "no
/// filters active" via `is_filtered()`.
#[derive(Debug, Clone)]
pub struct CatalogView<'a> {
    records: Vec<&'a CompanyRecord>,
    filtered: bool,
}

impl<'a> CatalogView<'a> {
    /// Root view over the whole catalog (no filters applied)
    pub fn of(catalog: &'a Catalog) -> Self {
        CatalogView {
            records: catalog.all().iter().collect(),
            filtered: false,
        }
    }

    /// Apply a predicate set, deriving a narrower view.
    ///
    /// Order-preserving and idempotent: refining a result with the same set
    /// again is a fixed point. Sidebar and tab-local sets may be chained in
    /// either order.
    pub fn refine(&self, filters: &FilterSet) -> CatalogView<'a> {
        CatalogView {
            records: self
                .records
                .iter()
                .copied()
                .filter(|r| filters.matches(r))
                .collect(),
            filtered: self.filtered || filters.is_active(),
        }
    }

    pub fn records(&self) -> &[&'a CompanyRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CompanyRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any filtering has been applied along the derivation chain
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
