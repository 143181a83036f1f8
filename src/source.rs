//! Quote source selection: the `source` query parameter → upstream mapping.

use crate::config::ProxyConfig;

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";
pub(crate) const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Upstream market-data source selected by the `source` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Credentialed JSON API; the `path` query parameter selects its endpoint.
    Finnhub,
    /// Credential-free CSV quote endpoint.
    Stooq,
}

impl Source {
    /// Parse a `source` query value. Matching is exact; unrecognised names
    /// return `None` and the proxy rejects the request with 400.
    pub fn parse(value: &str) -> Option<Source> {
        match value {
            "finnhub" => Some(Source::Finnhub),
            "stooq" => Some(Source::Stooq),
            _ => None,
        }
    }

    /// Wire name, as it appears in the `source` query parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Source::Finnhub => "finnhub",
            Source::Stooq => "stooq",
        }
    }

    /// Base URL for this source.
    pub fn base_url<'a>(&self, config: &'a ProxyConfig) -> &'a str {
        match self {
            Source::Finnhub => &config.finnhub_base_url,
            Source::Stooq => &config.stooq_base_url,
        }
    }

    /// Whether calls to this source carry the API credential header.
    pub fn requires_token(&self) -> bool {
        matches!(self, Source::Finnhub)
    }

    /// Content type for the proxied response. Stooq responses are always
    /// labelled CSV regardless of what the upstream sent; Finnhub responses
    /// keep the upstream value and fall back to JSON when it is absent.
    pub fn response_content_type<'a>(&self, upstream: Option<&'a str>) -> &'a str {
        match self {
            Source::Stooq => CSV_CONTENT_TYPE,
            Source::Finnhub => upstream.unwrap_or(JSON_CONTENT_TYPE),
        }
    }
}
