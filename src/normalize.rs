// Record Normalizer - raw nested JSON -> flat CompanyRecord
//
// One pass per company object: flatten nested maps into dotted paths
// (funding.amount, commercial_output.mwe), coerce field types, apply the
// default-value policy, and collect per-record issues. A bad record never
// aborts the batch; a record without a name is rejected and counted.

use crate::catalog::{Catalog, CompanyRecord};
use crate::fetch::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// NORMALIZATION ISSUES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Record rejected
    Warning,  // Record kept with degraded data
    Info,     // Cosmetic coercion applied
}

/// One per-record finding produced while normalizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationIssue {
    pub severity: Severity,
    /// Company name when known, otherwise the payload index ("record #4")
    pub record: String,
    pub field: String,
    pub message: String,
}

impl NormalizationIssue {
    pub fn critical(record: &str, field: &str, message: impl Into<String>) -> Self {
        NormalizationIssue {
            severity: Severity::Critical,
            record: record.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(record: &str, field: &str, message: impl Into<String>) -> Self {
        NormalizationIssue {
            severity: Severity::Warning,
            record: record.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// NORMALIZATION REPORT
// ============================================================================

/// Batch outcome: how many records arrived, survived, and what was degraded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub received: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub issues: Vec<NormalizationIssue>,
}

impl NormalizationReport {
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// One-line summary for CLI surfacing
    pub fn summary(&self) -> String {
        format!(
            "{} records received: {} accepted, {} rejected, {} warnings",
            self.received,
            self.accepted,
            self.rejected,
            self.warning_count()
        )
    }
}

// ============================================================================
// FLATTENING
// ============================================================================

/// Flatten nested objects into dotted-path keys.
///
/// `{"funding": {"amount": 5}}` becomes `{"funding.amount": 5}`. Arrays pass
/// through whole; the milestones list is a value, not a nesting level.
pub fn flatten(value: &Value) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    if let Value::Object(map) = value {
        for (key, val) in map {
            flatten_into(&mut flat, key, val);
        }
    }
    flat
}

fn flatten_into(flat: &mut BTreeMap<String, Value>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten_into(flat, &format!("{}.{}", prefix, key), val);
            }
        }
        other => {
            flat.insert(prefix.to_string(), other.clone());
        }
    }
}

// ============================================================================
// FIELD COERCION
// ============================================================================

/// String field: strings pass through, numbers are stringified, anything
/// else (or nothing) yields the default.
fn coerce_string(flat: &BTreeMap<String, Value>, key: &str, default: &str) -> String {
    match flat.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// Numeric field: non-negative numbers (or numeric strings) pass through,
/// everything else is absent. Negative values are treated as absent so they
/// cannot skew sums and means.
fn coerce_non_negative(
    flat: &BTreeMap<String, Value>,
    key: &str,
    record: &str,
    issues: &mut Vec<NormalizationIssue>,
) -> Option<f64> {
    let raw = flat.get(key)?;
    if raw.is_null() {
        return None;
    }
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v >= 0.0 => Some(v),
        Some(v) => {
            issues.push(NormalizationIssue::warning(
                record,
                key,
                format!("negative value {} treated as absent", v),
            ));
            None
        }
        None => {
            issues.push(NormalizationIssue::warning(
                record,
                key,
                format!("non-numeric value {} treated as absent", raw),
            ));
            None
        }
    }
}

/// Milestones: already a sequence -> pass through (scalars stringified);
/// a string -> parsed as a JSON array of strings, never evaluated as code.
/// Parse failure degrades to an empty list with a warning.
fn coerce_milestones(
    flat: &BTreeMap<String, Value>,
    key: &str,
    record: &str,
    issues: &mut Vec<NormalizationIssue>,
) -> Vec<String> {
    match flat.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(milestone_text).collect(),
        Some(Value::String(text)) => match serde_json::from_str::<Vec<Value>>(text) {
            Ok(items) => items.iter().map(milestone_text).collect(),
            Err(err) => {
                issues.push(NormalizationIssue::warning(
                    record,
                    key,
                    format!("unparsable milestone list: {}", err),
                ));
                Vec::new()
            }
        },
        Some(other) => {
            issues.push(NormalizationIssue::warning(
                record,
                key,
                format!("unexpected milestone value: {}", other),
            ));
            Vec::new()
        }
    }
}

fn milestone_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// RECORD NORMALIZATION
// ============================================================================

/// Normalize one raw company object.
///
/// Pure transform: returns the record plus any degradation warnings, or a
/// single Critical issue when the identity field is missing. `label` names
/// the record in issues before its name is known (e.g. "record #4").
pub fn normalize_company(
    raw: &Value,
    label: &str,
) -> Result<(CompanyRecord, Vec<NormalizationIssue>), NormalizationIssue> {
    let flat = flatten(raw);

    let name = match flat.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) => {
            return Err(NormalizationIssue::critical(label, "name", "name is empty"))
        }
        Some(other) => {
            return Err(NormalizationIssue::critical(
                label,
                "name",
                format!("name is not a string: {}", other),
            ))
        }
        None => return Err(NormalizationIssue::critical(label, "name", "name is missing")),
    };

    let mut issues = Vec::new();

    let employees =
        coerce_non_negative(&flat, "employees", &name, &mut issues).map(|v| v.round() as u64);
    let funding_usd = coerce_non_negative(&flat, "funding.amount", &name, &mut issues);
    let commercial_output_mwe =
        coerce_non_negative(&flat, "commercial_output.mwe", &name, &mut issues);
    let milestones =
        coerce_milestones(&flat, "milestones_past_12_months", &name, &mut issues);

    let record = CompanyRecord {
        description: coerce_string(&flat, "description", ""),
        location: coerce_string(&flat, "location", ""),
        year_founded: coerce_string(&flat, "year_founded", ""),
        employees,
        general_approach: coerce_string(&flat, "general_approach", "Unknown"),
        specific_approach: coerce_string(&flat, "specific_approach", "Unknown"),
        fuel_source: coerce_string(&flat, "fuel_source", "Unknown"),
        pilot_plant_timeline: coerce_string(&flat, "pilot_plant_timeline", ""),
        funding_usd,
        commercial_output_mwe,
        milestones_past_12_months: milestones,
        name,
    };

    Ok((record, issues))
}

// ============================================================================
// BATCH NORMALIZATION
// ============================================================================

/// Normalize the full payload: top-level `companies` array -> Catalog.
///
/// Per-record failures are collected, never fatal. Duplicate names keep the
/// first occurrence. Zero surviving records is a terminal error so downstream
/// filtering and aggregation never run against an empty base.
pub fn normalize_catalog(payload: &Value) -> Result<(Catalog, NormalizationReport), LoadError> {
    let companies = payload
        .get("companies")
        .ok_or(LoadError::MissingCompaniesKey)?
        .as_array()
        .ok_or(LoadError::MissingCompaniesKey)?;

    let mut records: Vec<CompanyRecord> = Vec::with_capacity(companies.len());
    let mut issues = Vec::new();
    let mut rejected = 0usize;

    for (index, raw) in companies.iter().enumerate() {
        let label = format!("record #{}", index + 1);
        match normalize_company(raw, &label) {
            Ok((record, record_issues)) => {
                issues.extend(record_issues);
                if records.iter().any(|r| r.name == record.name) {
                    rejected += 1;
                    issues.push(NormalizationIssue::warning(
                        &record.name,
                        "name",
                        "duplicate name, first occurrence kept",
                    ));
                } else {
                    records.push(record);
                }
            }
            Err(issue) => {
                rejected += 1;
                issues.push(issue);
            }
        }
    }

    let report = NormalizationReport {
        received: companies.len(),
        accepted: records.len(),
        rejected,
        issues,
    };

    if records.is_empty() {
        return Err(LoadError::NoValidRecords);
    }

    Ok((Catalog::new(records), report))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "companies": [
                {
                    "name": "Commonwealth Fusion Systems",
                    "description": "SPARC tokamak developer",
                    "location": "Devens, MA",
                    "year_founded": "2018-01-01",
                    "employees": 750,
                    "general_approach": "Magnetic Confinement",
                    "specific_approach": "Tokamak",
                    "fuel_source": "D-T",
                    "pilot_plant_timeline": "Early 2030s",
                    "funding": { "amount": 2000000000.0 },
                    "commercial_output": { "mwe": 400 },
                    "milestones_past_12_months": ["20 T magnet demo", "SPARC hall complete"]
                },
                {
                    "name": "Helion Energy",
                    "description": "Pulsed FRC with direct energy recovery",
                    "location": "Everett, WA",
                    "year_founded": "2013-01-01",
                    "employees": 500,
                    "general_approach": "Magneto-Inertial",
                    "specific_approach": "Field-Reversed Configuration",
                    "fuel_source": "D-He3",
                    "pilot_plant_timeline": "2028",
                    "funding": { "amount": 577000000.0 },
                    "commercial_output": { "mwe": 50 },
                    "milestones_past_12_months": "[\"Polaris construction\", \"100M C temperature\"]"
                }
            ]
        })
    }

    #[test]
    fn test_flatten_nested_paths() {
        let raw = json!({
            "name": "X",
            "funding": { "amount": 5.0, "round": "Series B" },
            "commercial_output": { "mwe": 40 }
        });

        let flat = flatten(&raw);

        assert_eq!(flat.get("name"), Some(&json!("X")));
        assert_eq!(flat.get("funding.amount"), Some(&json!(5.0)));
        assert_eq!(flat.get("funding.round"), Some(&json!("Series B")));
        assert_eq!(flat.get("commercial_output.mwe"), Some(&json!(40)));
        assert!(!flat.contains_key("funding"));
    }

    #[test]
    fn test_flatten_keeps_arrays_whole() {
        let raw = json!({ "milestones_past_12_months": ["a", "b"] });
        let flat = flatten(&raw);
        assert_eq!(
            flat.get("milestones_past_12_months"),
            Some(&json!(["a", "b"]))
        );
    }

    #[test]
    fn test_normalize_full_record() {
        let payload = sample_payload();
        let raw = &payload["companies"][0];

        let (record, issues) = normalize_company(raw, "record #1").unwrap();

        assert_eq!(record.name, "Commonwealth Fusion Systems");
        assert_eq!(record.employees, Some(750));
        assert_eq!(record.funding_usd, Some(2_000_000_000.0));
        assert_eq!(record.commercial_output_mwe, Some(400.0));
        assert_eq!(record.milestones_past_12_months.len(), 2);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_milestones_string_parsed_as_json() {
        let payload = sample_payload();
        let raw = &payload["companies"][1];

        let (record, issues) = normalize_company(raw, "record #2").unwrap();

        assert_eq!(
            record.milestones_past_12_months,
            vec!["Polaris construction", "100M C temperature"]
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_milestones_unparsable_string_degrades_to_empty() {
        let raw = json!({
            "name": "X",
            "milestones_past_12_months": "['python', 'repr']"
        });

        let (record, issues) = normalize_company(&raw, "record #1").unwrap();

        assert!(record.milestones_past_12_months.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].field, "milestones_past_12_months");
    }

    #[test]
    fn test_missing_name_rejects_record() {
        let raw = json!({ "description": "anonymous" });

        let err = normalize_company(&raw, "record #3").unwrap_err();

        assert_eq!(err.severity, Severity::Critical);
        assert_eq!(err.record, "record #3");
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_missing_numerics_are_absent_not_zero() {
        let raw = json!({ "name": "X" });

        let (record, _) = normalize_company(&raw, "record #1").unwrap();

        assert_eq!(record.employees, None);
        assert_eq!(record.funding_usd, None);
        assert_eq!(record.commercial_output_mwe, None);
        assert_eq!(record.fuel_source, "Unknown");
        assert_eq!(record.general_approach, "Unknown");
    }

    #[test]
    fn test_negative_numeric_treated_as_absent() {
        let raw = json!({ "name": "X", "employees": -4, "funding": { "amount": -1.0 } });

        let (record, issues) = normalize_company(&raw, "record #1").unwrap();

        assert_eq!(record.employees, None);
        assert_eq!(record.funding_usd, None);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    }

    #[test]
    fn test_numeric_string_coerced() {
        let raw = json!({ "name": "X", "employees": "42", "year_founded": 1998 });

        let (record, _) = normalize_company(&raw, "record #1").unwrap();

        assert_eq!(record.employees, Some(42));
        assert_eq!(record.year_founded, "1998");
    }

    #[test]
    fn test_normalize_catalog_batch() {
        let payload = sample_payload();

        let (catalog, report) = normalize_catalog(&payload).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(report.received, 2);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 0);
    }

    #[test]
    fn test_bad_record_does_not_abort_batch() {
        let payload = json!({
            "companies": [
                { "description": "no name" },
                { "name": "Survivor" }
            ]
        });

        let (catalog, report) = normalize_catalog(&payload).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.all()[0].name, "Survivor");
        assert_eq!(report.rejected, 1);
        assert!(report.summary().contains("1 rejected"));
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let payload = json!({
            "companies": [
                { "name": "Twin", "location": "First" },
                { "name": "Twin", "location": "Second" }
            ]
        });

        let (catalog, report) = normalize_catalog(&payload).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.by_name("Twin").unwrap().location, "First");
        assert_eq!(report.rejected, 1);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_missing_companies_key_is_terminal() {
        let payload = json!({ "firms": [] });
        let err = normalize_catalog(&payload).unwrap_err();
        assert!(matches!(err, LoadError::MissingCompaniesKey));
    }

    #[test]
    fn test_zero_valid_records_is_terminal() {
        let payload = json!({ "companies": [ { "description": "no name" } ] });
        let err = normalize_catalog(&payload).unwrap_err();
        assert!(matches!(err, LoadError::NoValidRecords));
    }
}
