//! Typed client for applications consuming the proxy.
//!
//! Wraps the HTTP surface in methods returning decoded models, with a
//! per-request deadline so a stalled proxy or upstream cannot hang the
//! caller.

use std::time::Duration;

use anyhow::{Context, Result, ensure};

use crate::model::{CandleSeries, Quote, StooqQuote};

/// Default per-request deadline for calls through the proxy.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Typed wrapper over the proxy's HTTP surface.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    /// Client pointing at `base_url` with the default deadline.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let base_url = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the real-time quote for `symbol`.
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let quote = self
            .http
            .get(&self.base_url)
            .query(&[("path", "quote"), ("symbol", symbol)])
            .send()
            .await
            .context("quote request failed")?
            .error_for_status()
            .context("quote request rejected")?
            .json()
            .await
            .context("invalid quote payload")?;
        Ok(quote)
    }

    /// Fetch historical candles for `symbol` between two Unix timestamps.
    /// A series whose parallel arrays disagree is rejected here rather than
    /// handed to the caller.
    pub async fn candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        from: i64,
        to: i64,
    ) -> Result<CandleSeries> {
        let from = from.to_string();
        let to = to.to_string();
        let series: CandleSeries = self
            .http
            .get(&self.base_url)
            .query(&[
                ("path", "stock/candle"),
                ("symbol", symbol),
                ("resolution", resolution.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .send()
            .await
            .context("candle request failed")?
            .error_for_status()
            .context("candle request rejected")?
            .json()
            .await
            .context("invalid candle payload")?;

        ensure!(
            series.is_consistent(),
            "candle series for {} has mismatched array lengths",
            symbol
        );
        Ok(series)
    }

    /// Fetch a quote through the credential-free CSV source.
    pub async fn stooq_quote(&self, code: &str) -> Result<StooqQuote> {
        let text = self
            .http
            .get(&self.base_url)
            .query(&[("source", "stooq"), ("code", code)])
            .send()
            .await
            .context("stooq request failed")?
            .error_for_status()
            .context("stooq request rejected")?
            .text()
            .await
            .context("failed to read stooq payload")?;
        StooqQuote::from_csv(&text)
    }
}

/// Candle resolution accepted by the candle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Minute1,
    Minute5,
    Minute15,
    Minute30,
    Minute60,
    Day,
    Week,
    Month,
}

impl Resolution {
    /// Wire form of the resolution.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Minute1 => "1",
            Resolution::Minute5 => "5",
            Resolution::Minute15 => "15",
            Resolution::Minute30 => "30",
            Resolution::Minute60 => "60",
            Resolution::Day => "D",
            Resolution::Week => "W",
            Resolution::Month => "M",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quote_fetches_and_decodes() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .query_param("path", "quote")
                    .query_param("symbol", "AAPL");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"c":195.5,"dp":0.8}"#);
            })
            .await;

        let client = QuoteClient::new(server.base_url()).unwrap();
        let quote = client.quote("AAPL").await.unwrap();

        assert_eq!(quote.current, 195.5);
        assert_eq!(quote.percent_change, 0.8);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_surfaces_as_error() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.any_request();
                then.status(429).body("rate limited");
            })
            .await;

        let client = QuoteClient::new(server.base_url()).unwrap();
        let err = client.quote("AAPL").await.unwrap_err();
        assert!(format!("{:#}", err).contains("rejected"), "got: {:#}", err);
    }

    #[tokio::test]
    async fn candles_fetch_includes_range_query() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .query_param("path", "stock/candle")
                    .query_param("symbol", "AAPL")
                    .query_param("resolution", "D")
                    .query_param("from", "1706000000")
                    .query_param("to", "1706300000");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"s":"ok","t":[1706100000],"o":[190.0],"h":[195.0],"l":[189.0],"c":[194.0],"v":[1000]}"#);
            })
            .await;

        let client = QuoteClient::new(server.base_url()).unwrap();
        let series = client
            .candles("AAPL", Resolution::Day, 1706000000, 1706300000)
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.close[0], 194.0);
        mock.assert_async().await;
    }

    /// A decoded series whose arrays disagree never reaches the caller.
    #[tokio::test]
    async fn mismatched_candles_are_rejected() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"s":"ok","t":[1,2],"o":[1.0],"h":[1.0],"l":[1.0],"c":[1.0],"v":[1.0]}"#);
            })
            .await;

        let client = QuoteClient::new(server.base_url()).unwrap();
        let err = client
            .candles("AAPL", Resolution::Day, 0, 1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mismatched"), "got: {}", err);
    }

    #[tokio::test]
    async fn stooq_quote_selects_source_and_parses_csv() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .query_param("source", "stooq")
                    .query_param("code", "aapl.us");
                then.status(200)
                    .header("content-type", "text/csv; charset=utf-8")
                    .body(
                        "Symbol,Date,Time,Open,High,Low,Close,Volume\n\
                         AAPL.US,2024-01-26,22:00:02,194.27,197.38,194.27,197.57,54822123\n",
                    );
            })
            .await;

        let client = QuoteClient::new(server.base_url()).unwrap();
        let quote = client.stooq_quote("aapl.us").await.unwrap();

        assert_eq!(quote.symbol, "AAPL.US");
        assert_eq!(quote.close, Some(197.57));
        mock.assert_async().await;
    }

    #[test]
    fn resolution_wire_strings() {
        assert_eq!(Resolution::Minute1.as_str(), "1");
        assert_eq!(Resolution::Minute60.as_str(), "60");
        assert_eq!(Resolution::Day.as_str(), "D");
        assert_eq!(Resolution::Week.as_str(), "W");
        assert_eq!(Resolution::Month.as_str(), "M");
    }

    /// The client enforces its deadline: a server that accepts and then
    /// stalls must not hang the caller.
    #[tokio::test]
    async fn stalled_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Hold accepted connections open without ever responding.
            let mut held = Vec::new();
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => held.push(stream),
                    Err(_) => return,
                }
            }
        });

        let client =
            QuoteClient::with_timeout(format!("http://{}", addr), Duration::from_millis(200))
                .unwrap();
        let err = client.quote("AAPL").await.unwrap_err();
        assert!(
            format!("{:#}", err).contains("quote request failed"),
            "got: {:#}",
            err
        );
    }
}
