//! Endpoint descriptors and per-call fetch options
//!
//! An `EndpointDescriptor` is the immutable configuration for one external
//! resource: base URL, relative path, default headers and query parameters,
//! and the request timeout. URL assembly validates both pieces and joins
//! them with exactly one separator, no matter how many trailing or leading
//! slashes either side carries.

use std::collections::HashMap;
use std::time::Duration;

use super::MarketError;

/// Default per-request timeout applied when a descriptor does not set one
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable configuration for one external GET resource
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    /// Base URL including scheme, e.g. `https://api.coingecko.com/api/v3`
    base_url: String,
    /// Path relative to the base URL, e.g. `coins/list`
    path: String,
    /// Headers sent when a call does not override them
    headers: HashMap<String, String>,
    /// Query parameters sent when a call does not override them
    params: HashMap<String, String>,
    /// Timeout applied when a call does not override it
    timeout: Duration,
}

impl EndpointDescriptor {
    /// Creates a descriptor for `path` under `base_url`
    pub fn new(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            headers: HashMap::new(),
            params: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the default headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the default query parameters
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Sets the default request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Assembles the full request URL
    ///
    /// The base URL and relative path are joined with exactly one `/`
    /// between them. Fails when the base URL is empty or missing an
    /// `http`/`https` scheme, or when the relative path is empty.
    pub fn url(&self) -> Result<String, MarketError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(MarketError::Configuration("base URL is empty".to_string()));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(MarketError::Configuration(format!(
                "base URL must start with http:// or https://: '{base}'"
            )));
        }

        let path = self.path.trim().trim_start_matches('/');
        if path.is_empty() {
            return Err(MarketError::Configuration(
                "relative path is empty".to_string(),
            ));
        }

        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    /// Headers effective for a call: overrides replace the defaults
    ///
    /// A non-empty override map is used as-is; it is never merged with the
    /// descriptor defaults.
    pub fn effective_headers<'a>(&'a self, options: &'a FetchOptions) -> &'a HashMap<String, String> {
        match &options.headers {
            Some(headers) if !headers.is_empty() => headers,
            _ => &self.headers,
        }
    }

    /// Query parameters effective for a call; same replace-not-merge rule
    /// as headers
    pub fn effective_params<'a>(&'a self, options: &'a FetchOptions) -> &'a HashMap<String, String> {
        match &options.params {
            Some(params) if !params.is_empty() => params,
            _ => &self.params,
        }
    }

    /// Timeout effective for a call
    pub fn effective_timeout(&self, options: &FetchOptions) -> Duration {
        options.timeout.unwrap_or(self.timeout)
    }
}

/// Per-call overrides for a fetch
///
/// Every field is optional; an unset field falls back to the descriptor
/// default. Override maps replace the defaults wholesale, they are never
/// merged with them.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Replacement query parameters
    pub params: Option<HashMap<String, String>>,
    /// Replacement headers
    pub headers: Option<HashMap<String, String>>,
    /// Replacement timeout
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_with_exactly_one_separator() {
        let with_slash = EndpointDescriptor::new("https://api.example.com/v3", "/coins/list");
        let without_slash = EndpointDescriptor::new("https://api.example.com/v3", "coins/list");

        assert_eq!(
            with_slash.url().unwrap(),
            "https://api.example.com/v3/coins/list"
        );
        assert_eq!(
            without_slash.url().unwrap(),
            "https://api.example.com/v3/coins/list"
        );
    }

    #[test]
    fn test_url_strips_trailing_separator_from_base() {
        let descriptor = EndpointDescriptor::new("https://api.example.com/v3/", "/coins/list");
        assert_eq!(
            descriptor.url().unwrap(),
            "https://api.example.com/v3/coins/list"
        );
    }

    #[test]
    fn test_url_rejects_empty_base() {
        let descriptor = EndpointDescriptor::new("", "coins/list");
        assert!(matches!(
            descriptor.url(),
            Err(MarketError::Configuration(_))
        ));
    }

    #[test]
    fn test_url_rejects_missing_scheme() {
        let descriptor = EndpointDescriptor::new("api.example.com/v3", "coins/list");
        assert!(matches!(
            descriptor.url(),
            Err(MarketError::Configuration(_))
        ));
    }

    #[test]
    fn test_url_rejects_empty_path() {
        let descriptor = EndpointDescriptor::new("https://api.example.com/v3", "");
        assert!(matches!(
            descriptor.url(),
            Err(MarketError::Configuration(_))
        ));

        // A path that is nothing but separators is empty too
        let descriptor = EndpointDescriptor::new("https://api.example.com/v3", "///");
        assert!(matches!(
            descriptor.url(),
            Err(MarketError::Configuration(_))
        ));
    }

    #[test]
    fn test_override_headers_replace_defaults() {
        let defaults = HashMap::from([("accept".to_string(), "application/json".to_string())]);
        let descriptor =
            EndpointDescriptor::new("https://api.example.com", "coins/list").with_headers(defaults);

        let overrides = HashMap::from([("x-test".to_string(), "1".to_string())]);
        let options = FetchOptions {
            headers: Some(overrides.clone()),
            ..Default::default()
        };

        let effective = descriptor.effective_headers(&options);
        assert_eq!(effective, &overrides);
        // Replaced, not merged: the default accept header is gone
        assert!(!effective.contains_key("accept"));
    }

    #[test]
    fn test_empty_override_headers_fall_back_to_defaults() {
        let defaults = HashMap::from([("accept".to_string(), "application/json".to_string())]);
        let descriptor = EndpointDescriptor::new("https://api.example.com", "coins/list")
            .with_headers(defaults.clone());

        let options = FetchOptions {
            headers: Some(HashMap::new()),
            ..Default::default()
        };

        assert_eq!(descriptor.effective_headers(&options), &defaults);
        assert_eq!(
            descriptor.effective_headers(&FetchOptions::default()),
            &defaults
        );
    }

    #[test]
    fn test_override_params_replace_defaults() {
        let defaults = HashMap::from([("vs_currency".to_string(), "usd".to_string())]);
        let descriptor =
            EndpointDescriptor::new("https://api.example.com", "coins/markets").with_params(defaults.clone());

        let overrides = HashMap::from([
            ("vs_currency".to_string(), "eur".to_string()),
            ("ids".to_string(), "bitcoin".to_string()),
        ]);
        let options = FetchOptions {
            params: Some(overrides.clone()),
            ..Default::default()
        };

        assert_eq!(descriptor.effective_params(&options), &overrides);
        assert_eq!(
            descriptor.effective_params(&FetchOptions::default()),
            &defaults
        );
    }

    #[test]
    fn test_timeout_defaults_and_overrides() {
        let descriptor = EndpointDescriptor::new("https://api.example.com", "coins/list")
            .with_timeout(Duration::from_secs(10));

        assert_eq!(
            descriptor.effective_timeout(&FetchOptions::default()),
            Duration::from_secs(10)
        );

        let options = FetchOptions {
            timeout: Some(Duration::from_secs(3)),
            ..Default::default()
        };
        assert_eq!(
            descriptor.effective_timeout(&options),
            Duration::from_secs(3)
        );
    }
}
