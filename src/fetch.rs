// Fetch boundary + catalog cache
//
// The remote endpoint serves one JSON document with a top-level `companies`
// array. Fetching is blocking with a bounded timeout; every failure mode is
// a distinct LoadError variant so the caller can surface a readable cause.
// The cache makes the expiry policy explicit: keyed by URL, populated on
// miss, served while fresh, reloaded after the TTL. A failed load caches
// nothing and there is no background retry.

use crate::catalog::Catalog;
use crate::normalize::{normalize_catalog, NormalizationReport};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Bounded fetch timeout
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cache lifetime (one hour, matching the upstream refresh cadence)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

// ============================================================================
// LOAD ERRORS
// ============================================================================

/// Terminal pipeline failures. All of these abort before any filtering or
/// aggregation is attempted; none of them shows partial data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    #[error("response body is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("expected 'companies' key not found in response")]
    MissingCompaniesKey,

    #[error("no valid company records in response")]
    NoValidRecords,
}

// ============================================================================
// FETCH
// ============================================================================

/// A freshly loaded catalog plus its load report and timestamp.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub report: NormalizationReport,
    pub fetched_at: DateTime<Utc>,
}

/// Fetch the company catalog from a remote JSON endpoint.
///
/// Blocking GET with a 30 second timeout. Non-2xx statuses, malformed JSON,
/// and a missing `companies` key are distinct errors; per-record problems
/// are tolerated and end up in the report instead.
pub fn fetch_catalog(url: &str) -> Result<LoadedCatalog, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;

    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    let body = response.text()?;
    let payload: Value = serde_json::from_str(&body).map_err(LoadError::MalformedJson)?;

    load_from_payload(&payload)
}

/// Normalize an already-parsed payload (shared by fetch and file loading).
pub fn load_from_payload(payload: &Value) -> Result<LoadedCatalog, LoadError> {
    let (catalog, report) = normalize_catalog(payload)?;
    Ok(LoadedCatalog {
        catalog,
        report,
        fetched_at: Utc::now(),
    })
}

// ============================================================================
// CATALOG CACHE
// ============================================================================

struct CacheEntry {
    loaded: LoadedCatalog,
    stored_at: Instant,
}

/// URL-keyed cache with a fixed time-to-live.
///
/// Explicit lifecycle instead of implicit memoization: populate-on-miss,
/// expire-after-TTL, invalidate-on-refresh. Expiry uses a monotonic clock so
/// wall-clock adjustments cannot resurrect stale data.
pub struct CatalogCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        CatalogCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Serve a fresh entry, or run the loader and cache its result.
    ///
    /// The loader is only invoked on a miss or after expiry. A loader failure
    /// propagates without touching the cache, so the next call retries.
    pub fn get_or_load<F>(&mut self, key: &str, loader: F) -> Result<&LoadedCatalog, LoadError>
    where
        F: FnOnce() -> Result<LoadedCatalog, LoadError>,
    {
        let fresh = self
            .entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)
            .unwrap_or(false);

        if !fresh {
            let loaded = loader()?;
            self.entries.insert(
                key.to_string(),
                CacheEntry {
                    loaded,
                    stored_at: Instant::now(),
                },
            );
        }

        Ok(&self.entries[key].loaded)
    }

    /// Drop one entry (explicit refresh)
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every expired entry
    pub fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
