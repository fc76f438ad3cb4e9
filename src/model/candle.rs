use chrono::NaiveDate;

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// All four prices and the volume are finite.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Sort bars by date and keep the last bar seen for any repeated date.
pub fn normalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    // Stable sort keeps arrival order within a date, so the last one is the latest.
    candles.sort_by_key(|c| c.date);
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match out.last_mut() {
            Some(prev) if prev.date == candle.date => *prev = candle,
            _ => out.push(candle),
        }
    }
    out
}
