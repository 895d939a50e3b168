// Fusion Catalog - Web Server
// JSON API over the normalization/filter/aggregation pipeline

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use fusion_catalog::{
    aggregate, fetch_catalog, load_from_payload, CatalogCache, CategoricalField, CompanyDetail,
    CompanyRecord, DistributionEntry, FilterSet, FundingBar, LoadedCatalog, NormalizationReport,
    ScatterPoint, ViewSummary, DEFAULT_API_URL,
};

/// Shared application state
///
/// The catalog is read-only after load, so sharing is a plain Arc with no
/// locking.
#[derive(Clone)]
struct AppState {
    catalog: Arc<fusion_catalog::Catalog>,
    report: Arc<NormalizationReport>,
    fetched_at: DateTime<Utc>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

/// Filter query parameters shared by /companies and /stats.
/// Multi-selects arrive comma-separated; `min_funding` is in USD.
#[derive(Debug, Default, Deserialize)]
struct FilterParams {
    fuel_source: Option<String>,
    approach: Option<String>,
    q: Option<String>,
    min_funding: Option<f64>,
}

impl FilterParams {
    fn to_filter_set(&self) -> FilterSet {
        let split = |raw: &Option<String>| -> HashSet<String> {
            raw.as_deref()
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };

        FilterSet {
            fuel_sources: split(&self.fuel_source),
            approaches: split(&self.approach),
            search_term: self.q.clone().unwrap_or_default(),
            min_funding_usd: self.min_funding.unwrap_or(0.0).max(0.0),
        }
    }
}

/// Company response (table row, simplified for API)
#[derive(Serialize)]
struct CompanyResponse {
    name: String,
    location: String,
    year_founded: String,
    employees: Option<u64>,
    funding_usd: Option<f64>,
    general_approach: String,
    specific_approach: String,
    fuel_source: String,
    commercial_output_mwe: Option<f64>,
    pilot_plant_timeline: String,
}

impl From<&CompanyRecord> for CompanyResponse {
    fn from(record: &CompanyRecord) -> Self {
        Self {
            name: record.name.clone(),
            location: record.location.clone(),
            year_founded: record.year_founded.clone(),
            employees: record.employees,
            funding_usd: record.funding_usd,
            general_approach: record.general_approach.clone(),
            specific_approach: record.specific_approach.clone(),
            fuel_source: record.fuel_source.clone(),
            commercial_output_mwe: record.commercial_output_mwe,
            pilot_plant_timeline: record.pilot_plant_timeline.clone(),
        }
    }
}

#[derive(Serialize)]
struct CompanyListResponse {
    total: usize,
    filtered: usize,
    companies: Vec<CompanyResponse>,
}

/// Stats response: metric cards plus chart data
#[derive(Serialize)]
struct StatsResponse {
    summary: ViewSummary,
    fuel_sources: Vec<DistributionEntry>,
    approaches: Vec<DistributionEntry>,
    funding_by_company: Vec<FundingBar>,
    employees_vs_output: Vec<ScatterPoint>,
}

/// Filter domains for selection widgets
#[derive(Serialize)]
struct FilterDomainsResponse {
    fuel_sources: Vec<String>,
    approaches: Vec<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    companies: usize,
    rejected_at_load: usize,
    fetched_at: DateTime<Utc>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check + load report
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        companies: state.catalog.len(),
        rejected_at_load: state.report.rejected,
        fetched_at: state.fetched_at,
    }))
}

/// GET /api/companies?fuel_source=D-T,D-D&approach=...&q=...&min_funding=...
async fn get_companies(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> impl IntoResponse {
    let view = state.catalog.view().refine(&params.to_filter_set());

    let companies: Vec<CompanyResponse> = view.iter().map(CompanyResponse::from).collect();

    Json(ApiResponse::ok(CompanyListResponse {
        total: state.catalog.len(),
        filtered: companies.len(),
        companies,
    }))
}

/// GET /api/companies/:name - Formatted detail for one company
async fn get_company_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded company name ("Commonwealth%20Fusion%20Systems")
    let decoded_name = urlencoding::decode(&name)
        .unwrap_or_else(|_| name.clone().into())
        .into_owned();

    match state.catalog.by_name(&decoded_name) {
        Some(record) => (
            StatusCode::OK,
            Json(ApiResponse::ok(CompanyDetail::from_record(record))),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!(
                "no company named '{}'",
                decoded_name
            ))),
        )
            .into_response(),
    }
}

/// GET /api/stats - Aggregates over the (optionally filtered) view
async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> impl IntoResponse {
    let view = state.catalog.view().refine(&params.to_filter_set());

    let stats = StatsResponse {
        summary: aggregate::summarize(&view),
        fuel_sources: aggregate::distribution(&view, CategoricalField::FuelSource),
        approaches: aggregate::distribution(&view, CategoricalField::GeneralApproach),
        funding_by_company: aggregate::funding_by_company(&view),
        employees_vs_output: aggregate::employees_vs_output(&view),
    };

    Json(ApiResponse::ok(stats))
}

/// GET /api/filters - Distinct values for the selection widgets
async fn get_filter_domains(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(FilterDomainsResponse {
        fuel_sources: state.catalog.distinct_values(CategoricalField::FuelSource),
        approaches: state
            .catalog
            .distinct_values(CategoricalField::GeneralApproach),
    }))
}

// ============================================================================
// Main Server
// ============================================================================

/// Load the catalog from a URL, or from a local JSON file when the source
/// names an existing path.
fn load_catalog(source: &str) -> Result<LoadedCatalog, String> {
    if std::path::Path::new(source).exists() {
        let body = std::fs::read_to_string(source).map_err(|e| e.to_string())?;
        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| e.to_string())?;
        return load_from_payload(&payload).map_err(|e| e.to_string());
    }

    // Cache is per-process; one entry, but the TTL policy is explicit
    let mut cache = CatalogCache::with_default_ttl();
    cache
        .get_or_load(source, || fetch_catalog(source))
        .map(|loaded| loaded.clone())
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    println!("☀️  Fusion Catalog - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let source = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    println!("🌐 Loading catalog from {}", source);

    // Blocking fetch happens off the async runtime worker
    let loaded = tokio::task::spawn_blocking(move || load_catalog(&source))
        .await
        .expect("catalog load task panicked");

    let loaded = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("❌ Failed to load catalog: {}", err);
            eprintln!("   The server will not start without data.");
            std::process::exit(1);
        }
    };

    println!("✓ {}", loaded.report.summary());

    let state = AppState {
        catalog: Arc::new(loaded.catalog),
        report: Arc::new(loaded.report),
        fetched_at: loaded.fetched_at,
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/companies", get(get_companies))
        .route("/companies/:name", get(get_company_detail))
        .route("/stats", get(get_stats))
        .route("/filters", get(get_filter_domains))
        .with_state(state.clone());

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   Companies: http://localhost:3000/api/companies");
    println!("   Stats:     http://localhost:3000/api/stats");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
