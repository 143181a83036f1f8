//! HTTP front door bridging browser clients to the quote upstreams.
//!
//! A request travels through the proxy as follows:
//! 1. OPTIONS requests, preflight or not, are answered by the CORS
//!    middleware layer with 200 without touching any upstream.
//! 2. The `source` selector picks the upstream (default `finnhub`); an
//!    unrecognized value is rejected with 400 before anything is forwarded.
//! 3. For credentialed sources the server-held token is attached as a
//!    request header. A missing token fails with 500 without an upstream
//!    call, so the credential can never be supplied by the caller.
//! 4. The upstream response is echoed back verbatim (status and body, one
//!    attempt, no retries), with the content type and cache hint applied
//!    per source.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderName, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Span, debug, error, info, instrument, warn};

use crate::config::ProxyConfig;
use crate::query;
use crate::source::Source;
use crate::upstream::{self, UpstreamResponse};

/// Finnhub endpoint used when the request carries no `path` selector.
const DEFAULT_FINNHUB_PATH: &str = "quote";
/// Stooq field list: symbol, date, time, OHLC and volume.
const STOOQ_QUOTE_FORMAT: &str = "sd2t2ohlcv";

/// Shared state handed to every request.
#[derive(Clone)]
pub struct ProxyState {
    config: Arc<ProxyConfig>,
    http: reqwest::Client,
}

impl ProxyState {
    /// Build the state and the HTTP client used for all upstream calls.
    /// The client enforces the configured upstream timeout.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

/// Assemble the proxy router: a single GET route wrapped in a permissive
/// CORS layer. The layer sits outside the routes so that error responses
/// and unmatched paths carry the browser headers too, and it answers all
/// OPTIONS requests itself.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/", get(handle_quote))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

/// Bind the listener and run the proxy until the process is stopped.
pub async fn serve(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let port = config.port;
    let state = ProxyState::new(config)?;
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Quote proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Single entry point for quote traffic.
#[instrument(
    name = "quote.proxy",
    skip_all,
    fields(source = tracing::field::Empty, upstream_status = tracing::field::Empty)
)]
async fn handle_quote(
    State(state): State<ProxyState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response<Body>, ProxyError> {
    let source = match query::first_value(&params, query::SOURCE_KEY) {
        Some(raw) => {
            Source::parse(raw).ok_or_else(|| ProxyError::UnknownSource(raw.to_string()))?
        }
        None => Source::Finnhub,
    };
    Span::current().record("source", source.name());

    let token = if source.requires_token() {
        let token = state
            .config
            .api_token
            .as_deref()
            .ok_or(ProxyError::MissingToken)?;
        Some(token)
    } else {
        None
    };

    let (url, forwarded) = match source {
        Source::Finnhub => finnhub_request(&state.config, &params),
        Source::Stooq => stooq_request(&state.config, &params),
    };

    debug!(url = %url, params = forwarded.len(), "Forwarding upstream request");

    let response = upstream::forward(&state.http, &url, &forwarded, token)
        .await
        .map_err(ProxyError::Transport)?;

    Span::current().record("upstream_status", response.status);
    debug!(
        status = response.status,
        bytes = response.body.len(),
        "Upstream responded"
    );

    Ok(proxy_response(&state.config, source, response))
}

/// Build the Finnhub request. The `path` selector picks the API endpoint
/// (default `quote`), every non-reserved parameter is forwarded in order,
/// and `code` doubles as `symbol` when no explicit symbol is present.
fn finnhub_request(
    config: &ProxyConfig,
    params: &[(String, String)],
) -> (String, Vec<(String, String)>) {
    let path = query::first_value(params, query::PATH_KEY).unwrap_or(DEFAULT_FINNHUB_PATH);
    let url = format!(
        "{}/{}",
        Source::Finnhub.base_url(config).trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    let mut forwarded = query::forwarded_params(params);
    if !query::has_key(&forwarded, "symbol") {
        if let Some(code) = query::first_value(params, query::CODE_KEY) {
            forwarded.push(("symbol".to_string(), code.to_string()));
        }
    }

    (url, forwarded)
}

/// Build the Stooq request. The CSV endpoint takes a fixed query shape:
/// instrument code, field list, header flag and format marker. Caller
/// parameters other than the code are not forwarded.
fn stooq_request(
    config: &ProxyConfig,
    params: &[(String, String)],
) -> (String, Vec<(String, String)>) {
    let code = query::first_value(params, query::CODE_KEY)
        .or_else(|| query::first_value(params, "symbol"))
        .unwrap_or_default();

    let url = format!(
        "{}/q/l/",
        Source::Stooq.base_url(config).trim_end_matches('/')
    );
    let forwarded = vec![
        ("s".to_string(), code.to_string()),
        ("f".to_string(), STOOQ_QUOTE_FORMAT.to_string()),
        ("h".to_string(), String::new()),
        ("e".to_string(), "csv".to_string()),
    ];

    (url, forwarded)
}

/// Translate a captured upstream response into the client reply. Status and
/// body pass through verbatim; the content type follows the source rules;
/// successful responses may carry a shared cache hint.
fn proxy_response(
    config: &ProxyConfig,
    source: Source,
    response: UpstreamResponse,
) -> Response<Body> {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = source.response_content_type(response.content_type.as_deref());

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type);

    if status.is_success() {
        if let Some(cache) = config.cache_control() {
            builder = builder.header(header::CACHE_CONTROL, cache);
        }
    }

    builder.body(Body::from(response.body)).unwrap()
}

/// Proxy failure modes, each mapped to a fixed client-facing status.
#[derive(Debug)]
pub enum ProxyError {
    /// A credentialed source was selected but no API token is configured.
    MissingToken,
    /// The `source` selector named an upstream this proxy does not speak.
    UnknownSource(String),
    /// The upstream call itself failed: connect, TLS, timeout or body read.
    Transport(String),
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::MissingToken => {
                write!(f, "server configuration error: missing API credential")
            }
            ProxyError::UnknownSource(source) => write!(f, "unknown quote source: {}", source),
            ProxyError::Transport(detail) => write!(f, "Proxy error: {}", detail),
        }
    }
}

impl std::error::Error for ProxyError {}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::MissingToken => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UnknownSource(_) => StatusCode::BAD_REQUEST,
            ProxyError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            ProxyError::UnknownSource(_) => warn!(error = %self, "Rejected proxy request"),
            _ => error!(error = %self, "Proxy request failed"),
        }

        (status, self.to_string()).into_response()
    }
}
