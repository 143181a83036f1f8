//! Wire models for the quote endpoints.
//!
//! Field names follow the upstream JSON (single-letter keys); the structs
//! expose them under readable names via serde renames.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Real-time quote.
///
/// Only the current price and the percent change are guaranteed; every
/// other field may be absent depending on the instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Current price.
    #[serde(rename = "c")]
    pub current: f64,
    /// Absolute change since previous close.
    #[serde(rename = "d", skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// Percent change since previous close.
    #[serde(rename = "dp")]
    pub percent_change: f64,
    /// Session high.
    #[serde(rename = "h", skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    /// Session low.
    #[serde(rename = "l", skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    /// Session open.
    #[serde(rename = "o", skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    /// Previous close.
    #[serde(rename = "pc", skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    /// Unix timestamp of the quote.
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Status marker on a candle response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandleStatus {
    /// Data is present; the series arrays are populated.
    Ok,
    /// The requested range holds no data; the arrays are absent or empty.
    NoData,
}

/// Historical candles in column-major form: one array per field, indexed
/// together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    #[serde(rename = "s")]
    pub status: CandleStatus,
    /// Unix timestamps, one per candle.
    #[serde(rename = "t", default)]
    pub timestamps: Vec<i64>,
    #[serde(rename = "o", default)]
    pub open: Vec<f64>,
    #[serde(rename = "h", default)]
    pub high: Vec<f64>,
    #[serde(rename = "l", default)]
    pub low: Vec<f64>,
    #[serde(rename = "c", default)]
    pub close: Vec<f64>,
    #[serde(rename = "v", default)]
    pub volume: Vec<f64>,
}

impl CandleSeries {
    /// Number of candles in the series.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// True when the parallel arrays agree. A `no_data` series is always
    /// consistent; an `ok` series requires every array to match the
    /// timestamp count.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            CandleStatus::NoData => true,
            CandleStatus::Ok => {
                let n = self.timestamps.len();
                self.open.len() == n
                    && self.high.len() == n
                    && self.low.len() == n
                    && self.close.len() == n
                    && self.volume.len() == n
            }
        }
    }
}

const STOOQ_NO_DATA: &str = "N/D";
const STOOQ_FIELDS: usize = 8;

/// One row of the Stooq CSV quote endpoint.
///
/// Stooq marks unavailable fields with `N/D`; those parse to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct StooqQuote {
    pub symbol: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl StooqQuote {
    /// Parse the CSV payload returned for the `sd2t2ohlcv` field list.
    /// Accepts the response with or without its header line.
    pub fn from_csv(text: &str) -> Result<Self> {
        let row = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .find(|line| !line.starts_with("Symbol"))
            .context("empty quote payload")?;

        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() != STOOQ_FIELDS {
            bail!(
                "malformed quote row: expected {} fields, got {}",
                STOOQ_FIELDS,
                fields.len()
            );
        }

        Ok(StooqQuote {
            symbol: fields[0].to_string(),
            date: text_field(fields[1]),
            time: text_field(fields[2]),
            open: num_field(fields[3]).context("open")?,
            high: num_field(fields[4]).context("high")?,
            low: num_field(fields[5]).context("low")?,
            close: num_field(fields[6]).context("close")?,
            volume: num_field(fields[7]).context("volume")?,
        })
    }
}

fn text_field(raw: &str) -> Option<String> {
    (raw != STOOQ_NO_DATA && !raw.is_empty()).then(|| raw.to_string())
}

fn num_field<T>(raw: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if raw == STOOQ_NO_DATA || raw.is_empty() {
        return Ok(None);
    }
    let value = raw
        .parse::<T>()
        .with_context(|| format!("invalid numeric field {:?}", raw))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Quote ──────────────────────────────────────────────────────────

    /// Only `c` and `dp` are required; everything else defaults to `None`.
    #[test]
    fn quote_minimal_payload_deserializes() {
        let quote: Quote = serde_json::from_str(r#"{"c":100.5,"dp":1.2}"#).unwrap();
        assert_eq!(quote.current, 100.5);
        assert_eq!(quote.percent_change, 1.2);
        assert_eq!(quote.change, None);
        assert_eq!(quote.previous_close, None);
    }

    #[test]
    fn quote_full_payload_deserializes() {
        let payload = r#"{"c":185.92,"d":-1.3,"dp":-0.69,"h":187.1,"l":184.6,"o":186.0,"pc":187.22,"t":1706302800}"#;
        let quote: Quote = serde_json::from_str(payload).unwrap();
        assert_eq!(quote.current, 185.92);
        assert_eq!(quote.change, Some(-1.3));
        assert_eq!(quote.high, Some(187.1));
        assert_eq!(quote.low, Some(184.6));
        assert_eq!(quote.open, Some(186.0));
        assert_eq!(quote.previous_close, Some(187.22));
        assert_eq!(quote.timestamp, Some(1706302800));
    }

    #[test]
    fn quote_missing_price_is_rejected() {
        assert!(serde_json::from_str::<Quote>(r#"{"dp":1.2}"#).is_err());
    }

    #[test]
    fn quote_serializes_back_to_wire_keys() {
        let quote: Quote = serde_json::from_str(r#"{"c":100.5,"dp":1.2}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&quote).unwrap(),
            r#"{"c":100.5,"dp":1.2}"#
        );
    }

    // ── Candles ────────────────────────────────────────────────────────

    #[test]
    fn candle_status_uses_wire_names() {
        assert_eq!(serde_json::to_string(&CandleStatus::Ok).unwrap(), r#""ok""#);
        assert_eq!(
            serde_json::to_string(&CandleStatus::NoData).unwrap(),
            r#""no_data""#
        );
    }

    fn ok_series() -> CandleSeries {
        serde_json::from_str(
            r#"{"s":"ok","t":[1,2,3],"o":[1.0,2.0,3.0],"h":[1.5,2.5,3.5],"l":[0.5,1.5,2.5],"c":[1.2,2.2,3.2],"v":[100,200,300]}"#,
        )
        .unwrap()
    }

    #[test]
    fn candle_series_deserializes_parallel_arrays() {
        let series = ok_series();
        assert_eq!(series.status, CandleStatus::Ok);
        assert_eq!(series.len(), 3);
        assert!(series.is_consistent());
        assert_eq!(series.close[2], 3.2);
    }

    /// A `no_data` response usually omits the arrays entirely; they must
    /// deserialize to empty vectors and count as consistent.
    #[test]
    fn candle_series_no_data_defaults_arrays() {
        let series: CandleSeries = serde_json::from_str(r#"{"s":"no_data"}"#).unwrap();
        assert_eq!(series.status, CandleStatus::NoData);
        assert!(series.is_empty());
        assert!(series.is_consistent());
    }

    #[test]
    fn candle_series_mismatched_arrays_are_inconsistent() {
        let series: CandleSeries =
            serde_json::from_str(r#"{"s":"ok","t":[1,2],"o":[1.0],"h":[],"l":[],"c":[],"v":[]}"#)
                .unwrap();
        assert!(!series.is_consistent());
    }

    // ── Stooq CSV ──────────────────────────────────────────────────────

    #[test]
    fn stooq_quote_parses_headed_csv() {
        let csv = "Symbol,Date,Time,Open,High,Low,Close,Volume\r\nAAPL.US,2024-01-26,22:00:02,194.27,197.38,194.27,197.57,54822123\r\n";
        let quote = StooqQuote::from_csv(csv).unwrap();
        assert_eq!(quote.symbol, "AAPL.US");
        assert_eq!(quote.date.as_deref(), Some("2024-01-26"));
        assert_eq!(quote.time.as_deref(), Some("22:00:02"));
        assert_eq!(quote.open, Some(194.27));
        assert_eq!(quote.close, Some(197.57));
        assert_eq!(quote.volume, Some(54822123));
    }

    #[test]
    fn stooq_quote_parses_bare_row() {
        let quote = StooqQuote::from_csv("SPY.US,2024-01-26,22:00:02,1.0,2.0,0.5,1.5,10").unwrap();
        assert_eq!(quote.symbol, "SPY.US");
        assert_eq!(quote.high, Some(2.0));
    }

    /// Unavailable fields arrive as `N/D` and become `None` instead of a
    /// parse error.
    #[test]
    fn stooq_no_data_markers_become_none() {
        let csv = "Symbol,Date,Time,Open,High,Low,Close,Volume\nXYZ,N/D,N/D,N/D,N/D,N/D,N/D,N/D";
        let quote = StooqQuote::from_csv(csv).unwrap();
        assert_eq!(quote.symbol, "XYZ");
        assert_eq!(quote.date, None);
        assert_eq!(quote.close, None);
        assert_eq!(quote.volume, None);
    }

    #[test]
    fn stooq_empty_payload_is_error() {
        assert!(StooqQuote::from_csv("").is_err());
        assert!(StooqQuote::from_csv("Symbol,Date,Time,Open,High,Low,Close,Volume\n").is_err());
    }

    #[test]
    fn stooq_short_row_is_error() {
        let err = StooqQuote::from_csv("AAPL.US,2024-01-26").unwrap_err();
        assert!(err.to_string().contains("expected 8 fields"), "got: {}", err);
    }

    #[test]
    fn stooq_bad_number_is_error() {
        let err =
            StooqQuote::from_csv("AAPL.US,2024-01-26,22:00:02,abc,2.0,0.5,1.5,10").unwrap_err();
        assert!(format!("{:#}", err).contains("open"), "got: {:#}", err);
    }
}
