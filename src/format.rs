// Presentation Formatter - raw fields -> display-ready strings
//
// Every function here is total: out-of-shape input degrades to a placeholder,
// it never fails. Scaling follows the dashboard conventions: metric cards
// show billions, per-company figures show millions.

use crate::catalog::CompanyRecord;
use serde::{Deserialize, Serialize};

/// Placeholder for values that cannot be displayed
pub const PLACEHOLDER: &str = "n/a";

// ============================================================================
// SCALAR FORMATTERS
// ============================================================================

/// "$2.0B" / "$577.0M", picking the scale by magnitude
pub fn format_usd(amount: f64) -> String {
    if amount >= 1.0e9 {
        format_usd_billions(amount)
    } else {
        format_usd_millions(amount)
    }
}

/// "$X.XM", one decimal
pub fn format_usd_millions(amount: f64) -> String {
    format!("${:.1}M", amount / 1.0e6)
}

/// "$X.XB", one decimal
pub fn format_usd_billions(amount: f64) -> String {
    format!("${:.1}B", amount / 1.0e9)
}

/// First 4 characters of the founding date, when they form a year.
///
/// "2012-01-01" -> "2012"; anything shorter or non-numeric degrades to the
/// placeholder instead of slicing out of range.
pub fn founding_year(year_founded: &str) -> String {
    let prefix: String = year_founded.chars().take(4).collect();
    if prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix
    } else {
        PLACEHOLDER.to_string()
    }
}

/// 12345 -> "12,345"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// "400 MWe", absent -> placeholder
pub fn format_mwe(output: Option<f64>) -> String {
    match output {
        Some(mwe) => format!("{:.0} MWe", mwe),
        None => PLACEHOLDER.to_string(),
    }
}

fn format_optional_usd_millions(amount: Option<f64>) -> String {
    match amount {
        Some(usd) => format_usd_millions(usd),
        None => PLACEHOLDER.to_string(),
    }
}

fn format_optional_count(value: Option<u64>) -> String {
    match value {
        Some(n) => group_thousands(n),
        None => PLACEHOLDER.to_string(),
    }
}

// ============================================================================
// COMPANY DETAIL
// ============================================================================

/// Display-ready field set for one selected company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDetail {
    pub name: String,
    pub description: String,
    pub location: String,
    pub founded: String,
    pub employees: String,
    /// "General - Specific", e.g. "Magnetic Confinement - Tokamak"
    pub approach: String,
    pub fuel_source: String,
    pub pilot_plant_timeline: String,
    pub funding: String,
    pub commercial_output: String,
    pub milestones: Vec<String>,
}

impl CompanyDetail {
    pub fn from_record(record: &CompanyRecord) -> Self {
        CompanyDetail {
            name: record.name.clone(),
            description: record.description.clone(),
            location: record.location.clone(),
            founded: founding_year(&record.year_founded),
            employees: format_optional_count(record.employees),
            approach: format!("{} - {}", record.general_approach, record.specific_approach),
            fuel_source: record.fuel_source.clone(),
            pilot_plant_timeline: record.pilot_plant_timeline.clone(),
            funding: format_optional_usd_millions(record.funding_usd),
            commercial_output: format_mwe(record.commercial_output_mwe),
            milestones: record.milestones_past_12_months.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_scaling() {
        assert_eq!(format_usd_millions(577_000_000.0), "$577.0M");
        assert_eq!(format_usd_billions(2_000_000_000.0), "$2.0B");

        // Auto scale switches at a billion
        assert_eq!(format_usd(999_000_000.0), "$999.0M");
        assert_eq!(format_usd(1_500_000_000.0), "$1.5B");
        assert_eq!(format_usd(0.0), "$0.0M");
    }

    #[test]
    fn test_founding_year_extraction() {
        assert_eq!(founding_year("2012-01-01"), "2012");
        assert_eq!(founding_year("1998"), "1998");
    }

    #[test]
    fn test_founding_year_degrades_safely() {
        assert_eq!(founding_year("99"), PLACEHOLDER);
        assert_eq!(founding_year(""), PLACEHOLDER);
        assert_eq!(founding_year("20ab-01-01"), PLACEHOLDER);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(12_345), "12,345");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_mwe() {
        assert_eq!(format_mwe(Some(400.0)), "400 MWe");
        assert_eq!(format_mwe(None), PLACEHOLDER);
    }

    #[test]
    fn test_company_detail_is_total() {
        let record = CompanyRecord {
            name: "Sparse Fusion".to_string(),
            description: String::new(),
            location: String::new(),
            year_founded: "99".to_string(),
            employees: None,
            general_approach: "Unknown".to_string(),
            specific_approach: "Unknown".to_string(),
            fuel_source: "Unknown".to_string(),
            pilot_plant_timeline: String::new(),
            funding_usd: None,
            commercial_output_mwe: None,
            milestones_past_12_months: Vec::new(),
        };

        let detail = CompanyDetail::from_record(&record);

        assert_eq!(detail.founded, PLACEHOLDER);
        assert_eq!(detail.employees, PLACEHOLDER);
        assert_eq!(detail.funding, PLACEHOLDER);
        assert_eq!(detail.commercial_output, PLACEHOLDER);
        assert_eq!(detail.approach, "Unknown - Unknown");
    }

    #[test]
    fn test_company_detail_formats_fields() {
        let record = CompanyRecord {
            name: "Commonwealth Fusion Systems".to_string(),
            description: "SPARC tokamak developer".to_string(),
            location: "Devens, MA".to_string(),
            year_founded: "2018-01-01".to_string(),
            employees: Some(750),
            general_approach: "Magnetic Confinement".to_string(),
            specific_approach: "Tokamak".to_string(),
            fuel_source: "D-T".to_string(),
            pilot_plant_timeline: "Early 2030s".to_string(),
            funding_usd: Some(2_000_000_000.0),
            commercial_output_mwe: Some(400.0),
            milestones_past_12_months: vec!["20 T magnet demo".to_string()],
        };

        let detail = CompanyDetail::from_record(&record);

        assert_eq!(detail.founded, "2018");
        assert_eq!(detail.employees, "750");
        assert_eq!(detail.funding, "$2000.0M");
        assert_eq!(detail.commercial_output, "400 MWe");
        assert_eq!(detail.approach, "Magnetic Confinement - Tokamak");
        assert_eq!(detail.milestones.len(), 1);
    }
}
