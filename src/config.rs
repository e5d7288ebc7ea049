//! CoinGecko adapter configuration
//!
//! Loads the adapter settings from `COINGECKO_*` environment variables with
//! defaults suitable for the free API tier. The demo tier adds an API-key
//! header; other key-bearing tiers are not supported.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use thiserror::Error;

/// Default CoinGecko API v3 base URL
pub const BASE_URL_V3: &str = "https://api.coingecko.com/api/v3";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default comparison currency for market-data endpoints
pub const DEFAULT_VS_CURRENCY: &str = "usd";

/// Default freshness window for cached payloads in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// User agent sent with every request
const USER_AGENT: &str = concat!("qrypt/", env!("CARGO_PKG_VERSION"));

/// Errors raised when the configuration is missing or inconsistent
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is empty
    #[error("base URL is empty")]
    EmptyBaseUrl,

    /// Base URL lacks an http/https scheme
    #[error("base URL must start with http or https: '{0}'")]
    MissingScheme(String),

    /// An environment variable did not parse as a number of seconds
    #[error("{name} must be a whole number of seconds, got '{value}'")]
    InvalidSeconds {
        /// The offending environment variable
        name: &'static str,
        /// Its raw value
        value: String,
    },

    /// Timeout must be strictly positive
    #[error("timeout must be greater than 0")]
    NonPositiveTimeout,

    /// Demo mode is enabled but no API key is set
    #[error("an API key is required when demo mode is enabled")]
    ApiKeyRequired,

    /// An API key is set without demo mode; only the demo tier is supported
    #[error("API keys are only supported for demo accounts")]
    ApiKeyWithoutDemo,

    /// No cache directory could be determined for the default store path
    #[error("no cache directory could be determined; set COINGECKO_CACHE_FILE")]
    NoCacheDir,
}

/// Settings for the CoinGecko adapter
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// API base URL including scheme
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Default headers sent with every request
    pub headers: HashMap<String, String>,
    /// Whether the authenticated demo tier is in use
    pub demo_user: bool,
    /// API key for the demo tier (empty when unused)
    pub api_key: String,
    /// Comparison currency for market-data endpoints
    pub vs_currency: String,
    /// Path of the cache store file
    pub cache_file: PathBuf,
    /// Freshness window for cached payloads
    pub cache_ttl: Duration,
}

impl CoinGeckoConfig {
    /// Loads and validates the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or("COINGECKO_BASE_URL", BASE_URL_V3);
        let timeout_secs = parse_secs(
            "COINGECKO_API_TIMEOUT",
            env::var("COINGECKO_API_TIMEOUT").ok(),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let demo_user = env::var("COINGECKO_API_DEMO_USER")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let api_key = env::var("COINGECKO_API_KEY").unwrap_or_default();
        let vs_currency = env_or("COINGECKO_VS_CURRENCY", DEFAULT_VS_CURRENCY);
        let cache_ttl_secs = parse_secs(
            "COINGECKO_CACHE_TTL",
            env::var("COINGECKO_CACHE_TTL").ok(),
            DEFAULT_CACHE_TTL_SECS,
        )?;
        let cache_file = match env::var("COINGECKO_CACHE_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_cache_file().ok_or(ConfigError::NoCacheDir)?,
        };

        let config = Self {
            headers: default_headers(demo_user, &api_key),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            demo_user,
            api_key,
            vs_currency,
            cache_file,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !self.base_url.starts_with("http") {
            return Err(ConfigError::MissingScheme(self.base_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::NonPositiveTimeout);
        }
        if self.demo_user && self.api_key.is_empty() {
            return Err(ConfigError::ApiKeyRequired);
        }
        if !self.demo_user && !self.api_key.is_empty() {
            return Err(ConfigError::ApiKeyWithoutDemo);
        }
        Ok(())
    }
}

/// Builds the default header set
///
/// Demo mode adds the `x-cg-demo-api-key` header when a key is present.
pub fn default_headers(demo_user: bool, api_key: &str) -> HashMap<String, String> {
    let mut headers = HashMap::from([
        ("accept".to_string(), "application/json".to_string()),
        ("user-agent".to_string(), USER_AGENT.to_string()),
    ]);
    if demo_user && !api_key.is_empty() {
        headers.insert("x-cg-demo-api-key".to_string(), api_key.to_string());
    }
    headers
}

/// Reads an environment variable, falling back to `default` when unset or blank
fn env_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Parses an optional seconds value, falling back to `default` when absent
fn parse_secs(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidSeconds { name, value }),
    }
}

/// Default cache store path under the XDG cache directory
///
/// `~/.cache/qrypt/coingecko.json` on Linux, or the platform equivalent.
/// Returns `None` if no home directory can be determined.
fn default_cache_file() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "qrypt")?;
    Some(project_dirs.cache_dir().join("coingecko.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: BASE_URL_V3.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers: default_headers(false, ""),
            demo_user: false,
            api_key: String::new(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            cache_file: PathBuf::from("/tmp/qrypt-test/coingecko.json"),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert_eq!(valid_config().validate(), Ok(()));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let config = CoinGeckoConfig {
            base_url: String::new(),
            ..valid_config()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn test_base_url_without_scheme_is_rejected() {
        let config = CoinGeckoConfig {
            base_url: "api.coingecko.com/api/v3".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingScheme(_))
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = CoinGeckoConfig {
            timeout: Duration::from_secs(0),
            ..valid_config()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveTimeout));
    }

    #[test]
    fn test_demo_mode_requires_an_api_key() {
        let config = CoinGeckoConfig {
            demo_user: true,
            ..valid_config()
        };
        assert_eq!(config.validate(), Err(ConfigError::ApiKeyRequired));
    }

    #[test]
    fn test_api_key_without_demo_mode_is_rejected() {
        let config = CoinGeckoConfig {
            api_key: "CG-test-key".to_string(),
            ..valid_config()
        };
        assert_eq!(config.validate(), Err(ConfigError::ApiKeyWithoutDemo));
    }

    #[test]
    fn test_demo_mode_with_key_is_accepted() {
        let config = CoinGeckoConfig {
            demo_user: true,
            api_key: "CG-test-key".to_string(),
            headers: default_headers(true, "CG-test-key"),
            ..valid_config()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_default_headers_without_demo_key() {
        let headers = default_headers(false, "");
        assert_eq!(headers.get("accept").map(String::as_str), Some("application/json"));
        assert!(headers.get("user-agent").is_some_and(|ua| ua.starts_with("qrypt/")));
        assert!(!headers.contains_key("x-cg-demo-api-key"));
    }

    #[test]
    fn test_default_headers_with_demo_key() {
        let headers = default_headers(true, "CG-test-key");
        assert_eq!(
            headers.get("x-cg-demo-api-key").map(String::as_str),
            Some("CG-test-key")
        );
    }

    #[test]
    fn test_parse_secs_falls_back_to_default() {
        assert_eq!(parse_secs("COINGECKO_API_TIMEOUT", None, 10), Ok(10));
        assert_eq!(
            parse_secs("COINGECKO_API_TIMEOUT", Some("  ".to_string()), 10),
            Ok(10)
        );
    }

    #[test]
    fn test_parse_secs_accepts_numbers_and_rejects_garbage() {
        assert_eq!(
            parse_secs("COINGECKO_CACHE_TTL", Some("45".to_string()), 30),
            Ok(45)
        );
        assert!(matches!(
            parse_secs("COINGECKO_CACHE_TTL", Some("soon".to_string()), 30),
            Err(ConfigError::InvalidSeconds { .. })
        ));
    }
}
