// Fusion Catalog - Core Library
// Normalization, filtering, and aggregation over a remote catalog of
// fusion-energy companies. Exposed for use in the CLI, API server, and tests.

pub mod aggregate;
pub mod catalog;
pub mod fetch;
pub mod filters;
pub mod format;
pub mod normalize;

// Re-export commonly used types
pub use aggregate::{
    distribution, employees_vs_output, funding_by_company, summarize, DistributionEntry,
    FundingBar, ScatterPoint, ViewSummary,
};
pub use catalog::{Catalog, CategoricalField, CompanyRecord};
pub use fetch::{
    fetch_catalog, load_from_payload, CatalogCache, LoadError, LoadedCatalog, DEFAULT_CACHE_TTL,
    FETCH_TIMEOUT,
};
pub use filters::{CatalogView, FilterSet};
pub use format::{
    format_mwe, format_usd, format_usd_billions, format_usd_millions, founding_year,
    group_thousands, CompanyDetail,
};
pub use normalize::{
    flatten, normalize_catalog, normalize_company, NormalizationIssue, NormalizationReport,
    Severity,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default remote endpoint serving the company catalog
pub const DEFAULT_API_URL: &str =
    "https://t3zwgehlujggonby.anvil.app/W643GQARK3IPDHVYLUUODAVX/_/api/file/fusion_companies_json";
