//! Command-line interface parsing for Qrypt
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --offline flag for skipping the startup sync and overrides for the
//! comparison currency and cache store path.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The specified comparison currency is not a plausible currency code
    #[error("Invalid currency: '{0}'. Expected a short code like 'usd', 'eur' or 'btc'")]
    InvalidCurrency(String),
}

/// Qrypt - Browse and edit a crypto token catalog with CoinGecko market data
#[derive(Parser, Debug)]
#[command(name = "qrypt")]
#[command(about = "Crypto token catalog with cached CoinGecko market data")]
#[command(version)]
pub struct Cli {
    /// Skip the startup sync with CoinGecko and start with an empty catalog
    #[arg(long)]
    pub offline: bool,

    /// Comparison currency for market data
    ///
    /// Examples:
    ///   qrypt --vs-currency eur
    ///   qrypt --vs-currency btc
    #[arg(long, value_name = "CURRENCY")]
    pub vs_currency: Option<String>,

    /// Path of the cache store file (overrides COINGECKO_CACHE_FILE)
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupConfig {
    /// Whether to skip the startup sync
    pub offline: bool,
    /// Comparison-currency override, already normalized to lowercase
    pub vs_currency: Option<String>,
    /// Cache-store path override
    pub cache_file: Option<PathBuf>,
}

/// Validates a currency code argument
///
/// CoinGecko currency codes are short and alphanumeric (`usd`, `eur`,
/// `btc`, ...); the authoritative list comes from the API itself, so this
/// only rejects obvious nonsense.
pub fn parse_currency_arg(s: &str) -> Result<String, CliError> {
    let code = s.trim().to_lowercase();
    if code.is_empty() || code.len() > 10 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CliError::InvalidCurrency(s.to_string()));
    }
    Ok(code)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let vs_currency = match &cli.vs_currency {
            Some(code) => Some(parse_currency_arg(code)?),
            None => None,
        };

        Ok(StartupConfig {
            offline: cli.offline,
            vs_currency,
            cache_file: cli.cache_file.clone(),
        })
    }
}
