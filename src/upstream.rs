//! Single-attempt upstream forwarding.

use bytes::Bytes;
use reqwest::Client;

/// Header carrying the API credential on credentialed calls. The credential
/// never travels as a query parameter.
pub const TOKEN_HEADER: &str = "X-Finnhub-Token";

/// Verbatim capture of an upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Send one GET to `url` with `query` appended, optionally attaching the
/// credential header.
///
/// Exactly one attempt per call: a failed or timed-out send comes back as an
/// error and is never retried, and a non-2xx status is not an error here
/// (the proxy echoes it to the client verbatim).
pub async fn forward(
    client: &Client,
    url: &str,
    query: &[(String, String)],
    token: Option<&str>,
) -> Result<UpstreamResponse, String> {
    let mut builder = client.get(url);

    if !query.is_empty() {
        builder = builder.query(query);
    }
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }

    let resp = builder
        .send()
        .await
        .map_err(|e| format!("upstream request failed: {}", e))?;

    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = resp
        .bytes()
        .await
        .map_err(|e| format!("failed to read upstream body: {}", e))?;

    Ok(UpstreamResponse {
        status,
        content_type,
        body,
    })
}
