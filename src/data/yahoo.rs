use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ForecastError;
use crate::model::candle::Candle;
use crate::model::frame::Frame;

use super::{candles_to_frame, date_from_secs, day_start_secs, http_client, DataSource};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Parse a `/v8/finance/chart` response. Gaps (`null`) become `NaN`.
pub fn parse_chart(body: &str) -> Result<Vec<Candle>, ForecastError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ForecastError::DataSource(format!("yahoo chart JSON parse failed: {}", e)))?;
    if let Some(err) = envelope.chart.error {
        return Err(ForecastError::DataSource(format!(
            "yahoo chart error ({}): {}",
            err.code, err.description
        )));
    }
    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten().unwrap_or(f64::NAN);

    let mut candles = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        candles.push(Candle {
            date: date_from_secs(*ts)?,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
            volume: at(&quote.volume, i),
        });
    }
    Ok(candles)
}

/// Yahoo Finance daily chart data (`BTC-USD`, `ETH-USD`, equities).
pub struct YahooChartSource {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl YahooChartSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ForecastError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl DataSource for YahooChartSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Frame, ForecastError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = day_start_secs(start).to_string();
        // period2 is exclusive; push it past `end` so the last day is included.
        let period2 = (day_start_secs(end) + 86_400).to_string();

        tracing::info!(symbol, %start, %end, "Fetching daily bars from yahoo");
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ])
            .send()?;
        let status = resp.status();
        let body = resp.text()?;

        // Error responses still carry a chart envelope with a description.
        let candles = match parse_chart(&body) {
            Ok(c) if status.is_success() => c,
            Ok(_) => {
                return Err(ForecastError::DataSource(format!(
                    "yahoo chart returned HTTP {}",
                    status
                )))
            }
            Err(e) => return Err(e),
        };
        tracing::info!(symbol, count = candles.len(), "Fetched daily bars");
        candles_to_frame(symbol, candles)
    }
}
