pub mod binance;
pub mod yahoo;

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};

use crate::error::ForecastError;
use crate::model::candle::{normalize_candles, Candle};
use crate::model::frame::Frame;

pub use binance::BinanceKlineSource;
pub use yahoo::YahooChartSource;

/// Daily OHLCV provider. One blocking call per forecast.
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily bars for `symbol` covering `start..=end`, as a raw OHLCV frame.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Frame, ForecastError>;
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, ForecastError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("crypto-forecast/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ForecastError::DataSource(format!("failed to build HTTP client: {}", e)))
}

pub(crate) fn day_start_secs(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

pub(crate) fn date_from_secs(secs: i64) -> Result<NaiveDate, ForecastError> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ForecastError::DataSource(format!("timestamp {} out of range", secs)))
}

/// Drop incomplete bars, order and de-duplicate by date, and build the raw
/// frame. An empty result is an error: there is nothing to forecast from.
pub fn candles_to_frame(symbol: &str, candles: Vec<Candle>) -> Result<Frame, ForecastError> {
    let received = candles.len();
    let complete: Vec<Candle> = candles.into_iter().filter(Candle::is_complete).collect();
    let dropped = received - complete.len();
    let candles = normalize_candles(complete);
    if candles.is_empty() {
        return Err(ForecastError::DataSource(format!(
            "no usable daily bars returned for {}",
            symbol
        )));
    }
    if dropped > 0 {
        tracing::warn!(symbol, dropped, "Dropped bars with missing values");
    }
    Ok(Frame::from_candles(&candles))
}
