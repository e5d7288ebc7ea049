//! Market-data layer for the CoinGecko API
//!
//! This module contains everything needed to pull reference data from
//! CoinGecko: endpoint descriptors (URL, headers, timeout), the GET fetch
//! strategy, the TTL-cached fetch wrapper, and the adapter that wires the
//! supported v3 endpoints together with typed response records.

pub mod adapter;
pub mod cached;
pub mod endpoint;
pub mod strategy;

pub use adapter::{CoinGeckoAdapter, CoinListing, MarketSnapshot};
pub use cached::{CachedFetch, FetchOutcome, PayloadSource};
pub use endpoint::{EndpointDescriptor, FetchOptions};
#[allow(unused_imports)]
pub use strategy::{FetchStrategy, GetEndpoint};

use thiserror::Error;

/// Errors that can occur when talking to the market-data API
#[derive(Debug, Error)]
pub enum MarketError {
    /// The endpoint descriptor is malformed (empty URL/path, missing scheme)
    #[error("invalid endpoint configuration: {0}")]
    Configuration(String),

    /// The server answered with a non-200 status
    #[error("HTTP {status} {reason}")]
    Status {
        /// Numeric HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        reason: String,
    },

    /// Network-level failure: timeout, connection refused, DNS
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}
