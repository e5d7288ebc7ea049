//! CoinGecko adapter
//!
//! Wires the supported v3 endpoints (`coins/list`, `coins/markets`, and
//! `simple/supported_vs_currencies`), each behind a TTL-cached GET strategy
//! sharing a single store file, and decodes their payloads into typed
//! records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::cache::CacheStore;
use crate::config::CoinGeckoConfig;

use super::cached::CachedFetch;
use super::endpoint::{EndpointDescriptor, FetchOptions};
use super::strategy::GetEndpoint;
use super::MarketError;

/// Cache key for the `coins/list` payload
const COINS_LIST_KEY: &str = "coins_list";

/// Cache key for the `coins/markets` payload
const COINS_MARKETS_KEY: &str = "coins_markets";

/// Cache key for the `simple/supported_vs_currencies` payload
const SUPPORTED_VS_CURRENCIES_KEY: &str = "supported_vs_currencies";

/// One row of the `coins/list` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinListing {
    /// CoinGecko coin id, e.g. `bitcoin`
    pub id: String,
    /// Ticker symbol, e.g. `btc`
    pub symbol: String,
    /// Display name, e.g. `Bitcoin`
    pub name: String,
    /// Platform name to contract address; addresses may be null or empty
    #[serde(default)]
    pub platforms: HashMap<String, Option<String>>,
}

/// One row of the `coins/markets` response (subset of fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// CoinGecko coin id
    pub id: String,
    /// Ticker symbol
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Logo image URL
    pub image: Option<String>,
    /// Price in the configured comparison currency
    pub current_price: Option<f64>,
    /// Market capitalization in the comparison currency
    pub market_cap: Option<f64>,
    /// When CoinGecko last updated this row
    pub last_updated: Option<DateTime<Utc>>,
}

/// Client for the supported CoinGecko v3 endpoints
///
/// All three endpoints share one HTTP client and one cache store file; each
/// has its own cache key and inherits the configured TTL.
#[derive(Debug, Clone)]
pub struct CoinGeckoAdapter {
    /// `coins/list` with platform addresses included
    pub coins_list: CachedFetch<GetEndpoint>,
    /// `coins/markets` in the configured comparison currency
    pub coins_markets: CachedFetch<GetEndpoint>,
    /// `simple/supported_vs_currencies`
    pub supported_vs_currencies: CachedFetch<GetEndpoint>,
}

impl CoinGeckoAdapter {
    /// Builds the adapter from a validated configuration
    pub fn new(config: &CoinGeckoConfig) -> Self {
        let client = Client::new();
        let store = CacheStore::new(config.cache_file.clone());

        let endpoint = |path: &str, params: HashMap<String, String>| {
            GetEndpoint::with_client(
                EndpointDescriptor::new(config.base_url.clone(), path)
                    .with_headers(config.headers.clone())
                    .with_params(params)
                    .with_timeout(config.timeout),
                client.clone(),
            )
        };

        Self {
            coins_list: CachedFetch::new(
                COINS_LIST_KEY,
                store.clone(),
                config.cache_ttl,
                endpoint(
                    "coins/list",
                    HashMap::from([("include_platform".to_string(), "true".to_string())]),
                ),
            ),
            coins_markets: CachedFetch::new(
                COINS_MARKETS_KEY,
                store.clone(),
                config.cache_ttl,
                endpoint(
                    "coins/markets",
                    HashMap::from([("vs_currency".to_string(), config.vs_currency.clone())]),
                ),
            ),
            supported_vs_currencies: CachedFetch::new(
                SUPPORTED_VS_CURRENCIES_KEY,
                store,
                config.cache_ttl,
                endpoint("simple/supported_vs_currencies", HashMap::new()),
            ),
        }
    }

    /// Fetches the full coin list with platform addresses
    pub async fn fetch_coins_list(&self) -> Result<Vec<CoinListing>, MarketError> {
        let outcome = self.coins_list.fetch(&FetchOptions::default()).await?;
        Ok(serde_json::from_value(outcome.payload)?)
    }

    /// Fetches market data in the configured comparison currency
    pub async fn fetch_coins_markets(&self) -> Result<Vec<MarketSnapshot>, MarketError> {
        let outcome = self.coins_markets.fetch(&FetchOptions::default()).await?;
        Ok(serde_json::from_value(outcome.payload)?)
    }

    /// Fetches the list of supported comparison currencies
    #[allow(dead_code)]
    pub async fn fetch_supported_vs_currencies(&self) -> Result<Vec<String>, MarketError> {
        let outcome = self
            .supported_vs_currencies
            .fetch(&FetchOptions::default())
            .await?;
        Ok(serde_json::from_value(outcome.payload)?)
    }
}
