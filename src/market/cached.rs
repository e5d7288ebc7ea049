//! TTL-cached fetch wrapper
//!
//! `CachedFetch` makes any fetch strategy idempotent-and-cheap within a
//! freshness window, backed by the durable [`CacheStore`] shared across
//! process invocations. A fresh entry is served without touching the
//! network; a missing, corrupt, or stale entry triggers a live fetch whose
//! result is written back under the cache key.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheError, CacheStore};

use super::endpoint::FetchOptions;
use super::strategy::FetchStrategy;
use super::MarketError;

/// Where the payload of a [`FetchOutcome`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// Served from a fresh cache entry; no live call was made
    Cache,
    /// Fetched live from the wrapped strategy
    Live,
}

/// Result of a cached fetch
#[derive(Debug)]
pub struct FetchOutcome {
    /// The JSON payload, fresh or cached
    pub payload: Value,
    /// Whether the payload was served from cache or fetched live
    pub source: PayloadSource,
    /// Set when a fresh payload could not be persisted; the payload itself
    /// is unaffected and still valid
    pub write_warning: Option<CacheError>,
}

/// Wraps a fetch strategy with a durable TTL cache
///
/// The hit/miss/write contract:
/// - entry younger than the TTL: return its payload, zero live calls;
/// - entry absent, malformed, or stale: invoke the wrapped strategy, persist
///   the result under this key (other keys untouched), return it;
/// - strategy failure: propagate the error, write nothing;
/// - persistence failure after a successful live fetch: return the fresh
///   payload anyway, carrying the write error as a non-fatal warning.
#[derive(Debug, Clone)]
pub struct CachedFetch<S> {
    /// Cache key identifying the logical resource, e.g. `coins_list`
    key: String,
    /// Durable store shared with other cached endpoints
    store: CacheStore,
    /// Freshness window
    ttl: Duration,
    /// The wrapped strategy
    inner: S,
}

impl<S: FetchStrategy> CachedFetch<S> {
    /// Wraps `inner` with a cache entry under `key` in `store`
    pub fn new(key: impl Into<String>, store: CacheStore, ttl: Duration, inner: S) -> Self {
        Self {
            key: key.into(),
            store,
            ttl,
            inner,
        }
    }

    /// Returns the cache key
    #[allow(dead_code)]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the wrapped strategy
    #[allow(dead_code)]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fetches the payload, serving from cache while the entry is fresh
    pub async fn fetch(&self, options: &FetchOptions) -> Result<FetchOutcome, MarketError> {
        if let Some(entry) = self.store.lookup(&self.key) {
            let age = now_epoch_seconds() - entry.ctime;
            if age < self.ttl.as_secs_f64() {
                debug!(key = %self.key, age, "cache hit");
                return Ok(FetchOutcome {
                    payload: entry.data,
                    source: PayloadSource::Cache,
                    write_warning: None,
                });
            }
            debug!(key = %self.key, age, "cache entry is stale");
        }

        let payload = self.inner.fetch(options).await?;

        let write_warning = self
            .store
            .insert(&self.key, &payload, now_epoch_seconds())
            .err();
        if let Some(err) = &write_warning {
            warn!(key = %self.key, %err, "fetched fresh payload but failed to persist it");
        }

        Ok(FetchOutcome {
            payload,
            source: PayloadSource::Live,
            write_warning,
        })
    }
}

/// Current UTC time as float seconds since the Unix epoch
fn now_epoch_seconds() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}
