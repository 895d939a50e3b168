// Aggregator - summary metrics and distributions over a derived view
//
// Everything here is a pure function of the view it is given. Sums and means
// only see present values; a view with no eligible values reports a defined
// zero instead of dividing by nothing.

use crate::catalog::CategoricalField;
use crate::filters::CatalogView;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// VIEW SUMMARY
// ============================================================================

/// The metric-card numbers for one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSummary {
    pub count: usize,
    /// Sum over records with a funding figure; 0.0 when none have one
    pub total_funding_usd: f64,
    /// Mean over records with an employee count; 0.0 when none have one
    pub mean_employees: f64,
    /// Mean over records with an output figure; 0.0 when none have one
    pub mean_output_mwe: f64,
}

/// Compute the summary metrics for a view.
pub fn summarize(view: &CatalogView) -> ViewSummary {
    let mut total_funding = 0.0;
    let mut employee_sum = 0u64;
    let mut employee_n = 0usize;
    let mut output_sum = 0.0;
    let mut output_n = 0usize;

    for record in view.iter() {
        if let Some(funding) = record.funding_usd {
            total_funding += funding;
        }
        if let Some(employees) = record.employees {
            employee_sum += employees;
            employee_n += 1;
        }
        if let Some(output) = record.commercial_output_mwe {
            output_sum += output;
            output_n += 1;
        }
    }

    ViewSummary {
        count: view.count(),
        total_funding_usd: total_funding,
        mean_employees: if employee_n > 0 {
            employee_sum as f64 / employee_n as f64
        } else {
            0.0
        },
        mean_output_mwe: if output_n > 0 {
            output_sum / output_n as f64
        } else {
            0.0
        },
    }
}

// ============================================================================
// CATEGORICAL DISTRIBUTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub value: String,
    pub count: usize,
}

/// Occurrence counts for a categorical field within a view.
///
/// Ordered by descending count, ties broken by first-seen order; this drives
/// the visual ranking of chart segments, so the order is part of the contract.
pub fn distribution(view: &CatalogView, field: CategoricalField) -> Vec<DistributionEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for record in view.iter() {
        let value = field.value_of(record);
        if !counts.contains_key(value) {
            first_seen.push(value);
        }
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut entries: Vec<(usize, &str)> = first_seen
        .iter()
        .enumerate()
        .map(|(rank, value)| (rank, *value))
        .collect();
    entries.sort_by(|(rank_a, value_a), (rank_b, value_b)| {
        counts[value_b]
            .cmp(&counts[value_a])
            .then(rank_a.cmp(rank_b))
    });

    entries
        .into_iter()
        .map(|(_, value)| DistributionEntry {
            value: value.to_string(),
            count: counts[value],
        })
        .collect()
}

// ============================================================================
// CHART SERIES
// ============================================================================

/// One bar of the funding-by-company chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingBar {
    pub name: String,
    pub funding_usd: f64,
}

/// Funding per company in view order, records without a figure omitted.
pub fn funding_by_company(view: &CatalogView) -> Vec<FundingBar> {
    view.iter()
        .filter_map(|record| {
            record.funding_usd.map(|funding_usd| FundingBar {
                name: record.name.clone(),
                funding_usd,
            })
        })
        .collect()
}

/// One point of the employees-vs-output scatter; funding sizes the bubble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub name: String,
    pub employees: u64,
    pub output_mwe: f64,
    pub funding_usd: Option<f64>,
}

/// Scatter points for records with both coordinates present.
pub fn employees_vs_output(view: &CatalogView) -> Vec<ScatterPoint> {
    view.iter()
        .filter_map(|record| match (record.employees, record.commercial_output_mwe) {
            (Some(employees), Some(output_mwe)) => Some(ScatterPoint {
                name: record.name.clone(),
                employees,
                output_mwe,
                funding_usd: record.funding_usd,
            }),
            _ => None,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CompanyRecord};
    use crate::filters::FilterSet;

    fn record(
        name: &str,
        fuel: &str,
        employees: Option<u64>,
        funding: Option<f64>,
        output: Option<f64>,
    ) -> CompanyRecord {
        CompanyRecord {
            name: name.to_string(),
            description: String::new(),
            location: "USA".to_string(),
            year_founded: "2010-01-01".to_string(),
            employees,
            general_approach: "Magnetic Confinement".to_string(),
            specific_approach: "Tokamak".to_string(),
            fuel_source: fuel.to_string(),
            pilot_plant_timeline: String::new(),
            funding_usd: funding,
            commercial_output_mwe: output,
            milestones_past_12_months: Vec::new(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            record("A", "D-T", Some(100), Some(1.0e9), Some(400.0)),
            record("B", "D-T", Some(300), Some(5.0e8), Some(200.0)),
            record("C", "p-B11", None, None, Some(300.0)),
        ])
    }

    #[test]
    fn test_summary_over_full_view() {
        let catalog = sample_catalog();
        let summary = summarize(&catalog.view());

        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_funding_usd, 1.5e9);
        // Employee mean over the two records that have a count
        assert_eq!(summary.mean_employees, 200.0);
        assert_eq!(summary.mean_output_mwe, 300.0);
    }

    #[test]
    fn test_absent_values_excluded_but_record_counted() {
        let catalog = Catalog::new(vec![record("Solo", "D-D", None, None, None)]);
        let summary = summarize(&catalog.view());

        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_funding_usd, 0.0);
        assert_eq!(summary.mean_employees, 0.0);
        assert_eq!(summary.mean_output_mwe, 0.0);
    }

    #[test]
    fn test_funding_additivity_over_partition() {
        let catalog = sample_catalog();
        let whole = summarize(&catalog.view()).total_funding_usd;

        // Partition by fuel source; the parts must sum back to the whole
        let dt = catalog
            .view()
            .refine(&FilterSet::new().with_fuel_sources(["D-T"]));
        let pb11 = catalog
            .view()
            .refine(&FilterSet::new().with_fuel_sources(["p-B11"]));
        assert_eq!(dt.count() + pb11.count(), catalog.len());

        let parts = summarize(&dt).total_funding_usd + summarize(&pb11).total_funding_usd;
        assert_eq!(whole, parts);
    }

    #[test]
    fn test_distribution_descending_with_first_seen_ties() {
        let catalog = Catalog::new(vec![
            record("A", "D-He3", None, None, None),
            record("B", "D-T", None, None, None),
            record("C", "D-T", None, None, None),
            record("D", "p-B11", None, None, None),
        ]);

        let dist = distribution(&catalog.view(), CategoricalField::FuelSource);

        assert_eq!(dist[0].value, "D-T");
        assert_eq!(dist[0].count, 2);
        // D-He3 and p-B11 tie at 1; D-He3 was seen first
        assert_eq!(dist[1].value, "D-He3");
        assert_eq!(dist[2].value, "p-B11");
    }

    #[test]
    fn test_distribution_counts_sum_to_view_count() {
        let catalog = sample_catalog();
        let view = catalog.view();

        let dist = distribution(&view, CategoricalField::FuelSource);
        let total: usize = dist.iter().map(|e| e.count).sum();

        assert_eq!(total, view.count());
    }

    #[test]
    fn test_empty_view_aggregates_to_zero() {
        let catalog = sample_catalog();
        let empty = catalog
            .view()
            .refine(&FilterSet::new().with_search_term("no match anywhere"));

        assert!(empty.is_empty());

        let summary = summarize(&empty);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_funding_usd, 0.0);
        assert_eq!(summary.mean_employees, 0.0);

        assert!(distribution(&empty, CategoricalField::FuelSource).is_empty());
        assert!(funding_by_company(&empty).is_empty());
    }

    #[test]
    fn test_funding_bars_skip_absent_and_keep_order() {
        let catalog = sample_catalog();
        let bars = funding_by_company(&catalog.view());

        let names: Vec<&str> = bars.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_scatter_requires_both_coordinates() {
        let catalog = sample_catalog();
        let points = employees_vs_output(&catalog.view());

        // C has output but no employee count
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "A");
        assert_eq!(points[0].employees, 100);
        assert_eq!(points[0].output_mwe, 400.0);
        assert_eq!(points[0].funding_usd, Some(1.0e9));
    }
}
