//! Region resolution.
//!
//! Answers "does this visitor's region require a consent prompt?" without the
//! caller knowing the lookup mechanism. Successful lookups are cached in
//! memory for one hour; failures are never cached and resolve to the
//! fail-safe "requires consent" answer.

mod countries;
mod http;

pub use countries::{requires_consent, CONSENT_REQUIRED_COUNTRIES};
pub use http::{HttpRegionLookup, LookupProvider};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::ConsentResult;
use crate::record::RegionContext;

/// How long a successful lookup is reused (1 hour).
pub const REGION_CACHE_TTL_MS: i64 = 60 * 60 * 1000;

/// Outcome of a region lookup. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionLookupResult {
    pub requires_consent: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl RegionLookupResult {
    /// The answer used whenever a lookup cannot be completed.
    pub fn fail_safe() -> Self {
        Self {
            requires_consent: true,
            country: None,
            region: None,
        }
    }

    /// Context stored with region-exempt records.
    pub fn to_context(&self, detection_method: &str) -> RegionContext {
        RegionContext {
            country: self.country.clone(),
            region: self.region.clone(),
            in_eu: self.requires_consent,
            detection_method: detection_method.to_string(),
        }
    }
}

/// One outbound region lookup.
#[async_trait]
pub trait RegionLookup: Send + Sync {
    async fn lookup(&self) -> ConsentResult<RegionLookupResult>;

    /// Name recorded as the detection method in region context.
    fn detection_method(&self) -> &str;
}

#[derive(Debug, Clone)]
struct CachedRegion {
    result: RegionLookupResult,
    fetched_at: i64,
}

/// Cached, fail-safe wrapper around a [`RegionLookup`].
#[derive(Clone)]
pub struct RegionResolver {
    lookup: Arc<dyn RegionLookup>,
    clock: Arc<dyn Clock>,
    cached: Arc<RwLock<Option<CachedRegion>>>,
}

impl std::fmt::Debug for RegionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionResolver")
            .field("detection_method", &self.lookup.detection_method())
            .finish()
    }
}

impl RegionResolver {
    pub fn new(lookup: Arc<dyn RegionLookup>) -> Self {
        Self::with_clock(lookup, Arc::new(SystemClock))
    }

    pub fn with_clock(lookup: Arc<dyn RegionLookup>, clock: Arc<dyn Clock>) -> Self {
        Self {
            lookup,
            clock,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Resolve the visitor's region.
    ///
    /// Never fails: any lookup error yields [`RegionLookupResult::fail_safe`],
    /// which is not cached so the next call retries.
    pub async fn resolve(&self) -> RegionLookupResult {
        {
            let cache = self.cached.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = self.clock.now_millis() - cached.fetched_at;
                if age < REGION_CACHE_TTL_MS {
                    debug!(age_ms = age, "using cached region lookup");
                    return cached.result.clone();
                }
            }
        }

        match self.lookup.lookup().await {
            Ok(result) => {
                debug!(
                    requires_consent = result.requires_consent,
                    country = ?result.country,
                    "region resolved"
                );
                let mut cache = self.cached.write().await;
                *cache = Some(CachedRegion {
                    result: result.clone(),
                    fetched_at: self.clock.now_millis(),
                });
                result
            }
            Err(e) => {
                warn!(error = %e, "region lookup failed, assuming consent is required");
                RegionLookupResult::fail_safe()
            }
        }
    }

    /// Drop the cached result so the next resolve performs a fresh lookup.
    pub async fn invalidate_cache(&self) {
        let mut cache = self.cached.write().await;
        *cache = None;
    }

    pub fn detection_method(&self) -> &str {
        self.lookup.detection_method()
    }
}
