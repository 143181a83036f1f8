//! # quote-proxy
//!
//! A stateless HTTP proxy bridging browser and mobile clients to market
//! data APIs that are unusable directly from a page: the upstream either
//! requires a secret API key or refuses cross-origin requests.
//!
//! ## How it works
//!
//! 1. A client sends `GET /?symbol=AAPL` (optionally `path=` to pick the
//!    upstream endpoint, `source=` to pick the upstream itself).
//! 2. The proxy strips the selector keys, attaches the server-held API
//!    token as a request header where the source requires one, and issues
//!    a single upstream GET.
//! 3. The upstream status and body are echoed back verbatim, with
//!    permissive CORS headers on every response so the exchange works from
//!    inside a browser page.
//! 4. Typed wrappers in [`client`] decode the payloads into [`model`]
//!    structs for native callers.
//!
//! ## Configuration (env vars)
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `FINNHUB_TOKEN` | (none) | Upstream API credential (`FINNHUB_API_KEY` is accepted as a fallback spelling). |
//! | `QUOTE_PROXY_PORT` | `8080` | Listening port. |
//! | `QUOTE_PROXY_FINNHUB_BASE_URL` | `https://finnhub.io/api/v1` | Credentialed JSON upstream. |
//! | `QUOTE_PROXY_STOOQ_BASE_URL` | `https://stooq.com` | Credential-free CSV upstream. |
//! | `QUOTE_PROXY_UPSTREAM_TIMEOUT_SECS` | `10` | Per-request upstream deadline. |
//! | `QUOTE_PROXY_CACHE_MAX_AGE_SECS` | `60` | `max-age` of the cache hint on successful responses; `0` disables it. |
//!
//! ## Response contract
//!
//! - Upstream status and body pass through verbatim; nothing is rewritten
//!   and nothing is retried.
//! - Every response carries `access-control-allow-origin: *`, error
//!   responses and unmatched paths included.
//! - The credential travels only as the `X-Finnhub-Token` request header;
//!   a `token` query parameter sent by the caller is dropped.

pub mod client;
pub mod config;
pub mod env;
pub mod model;
pub mod proxy;
pub mod query;
pub mod source;
pub mod upstream;

pub use client::{QuoteClient, Resolution};
pub use config::ProxyConfig;
pub use model::{CandleSeries, CandleStatus, Quote, StooqQuote};
pub use proxy::{ProxyState, router, serve};
pub use source::Source;
