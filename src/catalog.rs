// Catalog Table - immutable collection of normalized company records
// Loaded once per fetch; filtering derives views, never mutates the base.

use serde::{Deserialize, Serialize};

// ============================================================================
// COMPANY RECORD
// ============================================================================

/// One fusion company, flattened from the raw nested payload.
///
/// `name` is the identity: selection key in the UI and join key for detail
/// lookup. Numeric fields are `Option` because absent is not zero: a missing
/// funding amount must not drag sums and means toward zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub description: String,
    pub location: String,

    /// Raw founding date string; only the leading 4-digit year is displayed.
    pub year_founded: String,

    pub employees: Option<u64>,

    // Categorical fields; missing values default to "Unknown" so they still
    // show up in filter domains and distributions.
    pub general_approach: String,
    pub specific_approach: String,
    pub fuel_source: String,

    pub pilot_plant_timeline: String,

    /// From nested `funding.amount`, USD.
    pub funding_usd: Option<f64>,

    /// From nested `commercial_output.mwe`.
    pub commercial_output_mwe: Option<f64>,

    pub milestones_past_12_months: Vec<String>,
}

impl CompanyRecord {
    /// Case-insensitive substring match over name OR description.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

// ============================================================================
// CATEGORICAL FIELDS
// ============================================================================

/// The categorical columns that drive filter option lists and distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalField {
    FuelSource,
    GeneralApproach,
    SpecificApproach,
    Location,
}

impl CategoricalField {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            CategoricalField::FuelSource => "Fuel Source",
            CategoricalField::GeneralApproach => "General Approach",
            CategoricalField::SpecificApproach => "Specific Approach",
            CategoricalField::Location => "Location",
        }
    }

    /// Extract this field's value from a record
    pub fn value_of<'a>(&self, record: &'a CompanyRecord) -> &'a str {
        match self {
            CategoricalField::FuelSource => &record.fuel_source,
            CategoricalField::GeneralApproach => &record.general_approach,
            CategoricalField::SpecificApproach => &record.specific_approach,
            CategoricalField::Location => &record.location,
        }
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Immutable, ordered collection of company records.
///
/// Built once by the normalizer (load order preserved) and read-only for the
/// rest of the session. The loader guarantees it is never empty; a fetch that
/// yields zero valid records fails before a `Catalog` exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    records: Vec<CompanyRecord>,
}

impl Catalog {
    pub fn new(records: Vec<CompanyRecord>) -> Self {
        Catalog { records }
    }

    /// Full ordered sequence, load order preserved
    pub fn all(&self) -> &[CompanyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a categorical field, in first-seen order.
    ///
    /// First-seen order keeps filter option lists stable across re-renders
    /// without imposing an alphabetical sort the upstream data never had.
    pub fn distinct_values(&self, field: CategoricalField) -> Vec<String> {
        let mut seen = Vec::new();
        for record in &self.records {
            let value = field.value_of(record);
            if !seen.iter().any(|v| v == value) {
                seen.push(value.to_string());
            }
        }
        seen
    }

    /// Single record lookup by name (detail view after a user selection)
    pub fn by_name(&self, name: &str) -> Option<&CompanyRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Root view over the whole catalog; filters derive from this.
    pub fn view(&self) -> crate::filters::CatalogView<'_> {
        crate::filters::CatalogView::of(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================
