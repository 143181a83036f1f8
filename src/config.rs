//! Proxy configuration, resolved once at startup.

use std::time::Duration;

use crate::env::ReadEnv;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
const DEFAULT_STOOQ_BASE_URL: &str = "https://stooq.com";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_MAX_AGE_SECS: u32 = 60;

/// Configuration for the quote proxy.
///
/// Resolved from environment variables:
/// - `FINNHUB_TOKEN`: upstream API credential (`FINNHUB_API_KEY` is accepted
///   as a fallback spelling); leaving both unset makes credentialed requests
///   fail with 500
/// - `QUOTE_PROXY_PORT`: HTTP listening port (default: 8080)
/// - `QUOTE_PROXY_FINNHUB_BASE_URL`: credentialed JSON upstream base URL
///   (default: `https://finnhub.io/api/v1`)
/// - `QUOTE_PROXY_STOOQ_BASE_URL`: credential-free CSV upstream base URL
///   (default: `https://stooq.com`)
/// - `QUOTE_PROXY_UPSTREAM_TIMEOUT_SECS`: outbound request timeout (default: 10)
/// - `QUOTE_PROXY_CACHE_MAX_AGE_SECS`: `cache-control` max-age attached to
///   2xx responses; `0` disables the header (default: 60)
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Credential injected as a header on credentialed upstream calls.
    /// Never forwarded as a query parameter.
    pub api_token: Option<String>,
    /// TCP port the proxy listens on. Default: `8080`.
    pub port: u16,
    /// Base URL of the credentialed JSON upstream.
    pub finnhub_base_url: String,
    /// Base URL of the credential-free CSV upstream.
    pub stooq_base_url: String,
    /// Timeout for the single outbound attempt per request. Default: `10s`.
    pub upstream_timeout: Duration,
    /// `cache-control` max-age for 2xx responses; `0` disables. Default: `60`.
    pub cache_max_age_secs: u32,
}

impl ProxyConfig {
    /// Create a config with every field at its default and no credential.
    pub fn new() -> Self {
        Self {
            api_token: None,
            port: DEFAULT_PORT,
            finnhub_base_url: DEFAULT_FINNHUB_BASE_URL.to_string(),
            stooq_base_url: DEFAULT_STOOQ_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
        }
    }

    pub fn from_env<E: ReadEnv>(env: &E) -> Self {
        Self {
            api_token: env
                .var("FINNHUB_TOKEN")
                .or_else(|_| env.var("FINNHUB_API_KEY"))
                .ok(),
            port: parse_var_or(env, "QUOTE_PROXY_PORT", DEFAULT_PORT),
            finnhub_base_url: env
                .var("QUOTE_PROXY_FINNHUB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FINNHUB_BASE_URL.to_string()),
            stooq_base_url: env
                .var("QUOTE_PROXY_STOOQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_STOOQ_BASE_URL.to_string()),
            upstream_timeout: Duration::from_secs(parse_var_or(
                env,
                "QUOTE_PROXY_UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )),
            cache_max_age_secs: parse_var_or(
                env,
                "QUOTE_PROXY_CACHE_MAX_AGE_SECS",
                DEFAULT_CACHE_MAX_AGE_SECS,
            ),
        }
    }

    /// Override the API credential.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Override the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the credentialed upstream base URL (mock server in tests).
    pub fn with_finnhub_base_url(mut self, url: impl Into<String>) -> Self {
        self.finnhub_base_url = url.into();
        self
    }

    /// Override the CSV upstream base URL (mock server in tests).
    pub fn with_stooq_base_url(mut self, url: impl Into<String>) -> Self {
        self.stooq_base_url = url.into();
        self
    }

    /// Override the outbound request timeout.
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Override the `cache-control` max-age; `0` disables the header.
    pub fn with_cache_max_age_secs(mut self, secs: u32) -> Self {
        self.cache_max_age_secs = secs;
        self
    }

    /// `cache-control` header value for 2xx responses, `None` when disabled.
    pub(crate) fn cache_control(&self) -> Option<String> {
        (self.cache_max_age_secs > 0).then(|| format!("public, max-age={}", self.cache_max_age_secs))
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a numeric variable, falling back to `default` when it is unset or
/// not a valid number.
fn parse_var_or<E: ReadEnv, T: std::str::FromStr>(env: &E, key: &str, default: T) -> T {
    match env.var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(var = key, value = %raw, "Invalid numeric value, using default");
            default
        }),
        Err(_) => default,
    }
}
