use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ForecastError;
use crate::model::candle::Candle;
use crate::model::frame::Frame;

use super::{candles_to_frame, date_from_secs, day_start_secs, http_client, DataSource};

const KLINES_LIMIT: usize = 1000;
const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Deserialize)]
struct BinanceApiErrorResponse {
    code: i64,
    msg: String,
}

/// `BTC-USD` style symbols quote in USDT on Binance spot.
pub fn binance_symbol(symbol: &str) -> String {
    let upper = symbol.trim().to_ascii_uppercase();
    match upper.split_once('-') {
        Some((base, "USD")) => format!("{}USDT", base),
        Some((base, quote)) => format!("{}{}", base, quote),
        None => upper,
    }
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse `GET /api/v3/klines` rows:
/// `[open_time_ms, "open", "high", "low", "close", "volume", close_time_ms, ...]`.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, ForecastError> {
    if let Ok(err) = serde_json::from_str::<BinanceApiErrorResponse>(body) {
        return Err(ForecastError::DataSource(format!(
            "binance API error (code {}): {}",
            err.code, err.msg
        )));
    }
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)
        .map_err(|e| ForecastError::DataSource(format!("binance klines JSON parse failed: {}", e)))?;

    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let open_time = row
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| ForecastError::DataSource("kline row without open time".to_string()))?;
        let field = |i: usize| row.get(i).and_then(number).unwrap_or(f64::NAN);
        candles.push(Candle {
            date: date_from_secs(open_time.div_euclid(1000))?,
            open: field(1),
            high: field(2),
            low: field(3),
            close: field(4),
            volume: field(5),
        });
    }
    Ok(candles)
}

/// Binance spot daily klines.
pub struct BinanceKlineSource {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceKlineSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ForecastError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn fetch_page(&self, symbol: &str, start_ms: i64, end_ms: i64) -> Result<Vec<Candle>, ForecastError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let start_s = start_ms.to_string();
        let end_s = end_ms.to_string();
        let limit_s = KLINES_LIMIT.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", "1d"),
                ("startTime", start_s.as_str()),
                ("endTime", end_s.as_str()),
                ("limit", limit_s.as_str()),
            ])
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        let candles = parse_klines(&body)?;
        if !status.is_success() {
            return Err(ForecastError::DataSource(format!(
                "binance klines returned HTTP {}",
                status
            )));
        }
        Ok(candles)
    }
}

impl DataSource for BinanceKlineSource {
    fn name(&self) -> &'static str {
        "binance"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Frame, ForecastError> {
        let pair = binance_symbol(symbol);
        let end_ms = (day_start_secs(end) * 1000) + DAY_MS - 1;
        let mut start_ms = day_start_secs(start) * 1000;

        tracing::info!(symbol, pair = %pair, %start, %end, "Fetching daily klines from binance");
        let mut candles: Vec<Candle> = Vec::new();
        while start_ms <= end_ms {
            let page = self.fetch_page(&pair, start_ms, end_ms)?;
            let Some(last) = page.last() else {
                break;
            };
            start_ms = day_start_secs(last.date) * 1000 + DAY_MS;
            let full = page.len() >= KLINES_LIMIT;
            candles.extend(page);
            if !full {
                break;
            }
        }
        tracing::info!(symbol, count = candles.len(), "Fetched daily bars");
        candles_to_frame(symbol, candles)
    }
}
