use crate::error::ForecastError;
use crate::model::frame::{Frame, CLOSE, HIGH, LOW, OPEN, VOLUME};

use super::ema::ema_series;
use super::sma::sma_series;
use super::window::{rolling_series, RollingWindow};

pub const SMA_10: &str = "SMA_10";
pub const SMA_20: &str = "SMA_20";
pub const SMA_50: &str = "SMA_50";
pub const EMA_12: &str = "EMA_12";
pub const EMA_26: &str = "EMA_26";
pub const RSI_14: &str = "RSI_14";
pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_Signal";
pub const MACD_DIFF: &str = "MACD_Diff";
pub const BB_UPPER: &str = "BB_Upper";
pub const BB_LOWER: &str = "BB_Lower";
pub const BB_MIDDLE: &str = "BB_Middle";
pub const ATR_14: &str = "ATR_14";
pub const STOCH_K: &str = "Stoch_K";
pub const STOCH_D: &str = "Stoch_D";
pub const VOLUME_MA: &str = "Volume_MA";
pub const VOLUME_RATIO: &str = "Volume_Ratio";
pub const DAILY_RETURN: &str = "Daily_Return";
pub const LOG_RETURN: &str = "Log_Return";
pub const PRICE_CHANGE: &str = "Price_Change";
pub const HIGH_LOW: &str = "High_Low";

/// Longest trailing window of any indicator. Shorter histories never
/// produce a complete feature row.
pub const LONGEST_WINDOW: usize = 50;

const RSI_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const STOCH_K_PERIOD: usize = 14;
const STOCH_D_PERIOD: usize = 3;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_WIDTH: f64 = 2.0;
const VOLUME_MA_PERIOD: usize = 20;
const MACD_SIGNAL_SPAN: usize = 9;

/// Extend a raw OHLCV frame with every technical indicator column.
///
/// The output keeps the input's rows and order. Cells whose trailing window is
/// not yet full are `NaN`; divisions by zero are left as `NaN`/`±inf` for the
/// sanitizer to deal with.
pub fn compute_indicators(raw: &Frame) -> Result<Frame, ForecastError> {
    if raw.is_empty() {
        return Err(ForecastError::Schema("input table has no rows".to_string()));
    }
    let open = raw.require(OPEN)?;
    let high = raw.require(HIGH)?;
    let low = raw.require(LOW)?;
    let close = raw.require(CLOSE)?;
    let volume = raw.require(VOLUME)?;
    raw.check_chronological()?;

    let ema_12 = ema_series(close, 12);
    let ema_26 = ema_series(close, 26);
    let macd: Vec<f64> = ema_12.iter().zip(&ema_26).map(|(f, s)| f - s).collect();
    let macd_signal = ema_series(&macd, MACD_SIGNAL_SPAN);
    let macd_diff: Vec<f64> = macd.iter().zip(&macd_signal).map(|(m, s)| m - s).collect();

    let bb_middle = sma_series(close, BOLLINGER_PERIOD);
    let bb_std = rolling_series(close, BOLLINGER_PERIOD, RollingWindow::std_dev);
    let bb_upper: Vec<f64> = bb_middle
        .iter()
        .zip(&bb_std)
        .map(|(m, s)| m + BOLLINGER_WIDTH * s)
        .collect();
    let bb_lower: Vec<f64> = bb_middle
        .iter()
        .zip(&bb_std)
        .map(|(m, s)| m - BOLLINGER_WIDTH * s)
        .collect();

    let (stoch_k, stoch_d) = stochastic(high, low, close);

    let volume_ma = sma_series(volume, VOLUME_MA_PERIOD);
    let volume_ratio: Vec<f64> = volume
        .iter()
        .zip(&volume_ma)
        .map(|(v, ma)| if *ma == 0.0 { *v } else { v / ma })
        .collect();

    let prev_close = |i: usize| if i == 0 { f64::NAN } else { close[i - 1] };
    let daily_return: Vec<f64> = (0..close.len())
        .map(|i| (close[i] - prev_close(i)) / prev_close(i))
        .collect();
    let log_return: Vec<f64> = (0..close.len())
        .map(|i| (close[i] / prev_close(i)).ln())
        .collect();

    let price_change: Vec<f64> = close.iter().zip(open).map(|(c, o)| c - o).collect();
    let high_low: Vec<f64> = high.iter().zip(low).map(|(h, l)| h - l).collect();

    let mut out = raw.clone();
    out.set_column(SMA_10, sma_series(close, 10));
    out.set_column(SMA_20, sma_series(close, 20));
    out.set_column(SMA_50, sma_series(close, 50));
    out.set_column(EMA_12, ema_12);
    out.set_column(EMA_26, ema_26);
    out.set_column(RSI_14, rsi(close, RSI_PERIOD));
    out.set_column(MACD, macd);
    out.set_column(MACD_SIGNAL, macd_signal);
    out.set_column(MACD_DIFF, macd_diff);
    out.set_column(BB_UPPER, bb_upper);
    out.set_column(BB_LOWER, bb_lower);
    out.set_column(BB_MIDDLE, bb_middle);
    out.set_column(ATR_14, atr(high, low, close, ATR_PERIOD));
    out.set_column(STOCH_K, stoch_k);
    out.set_column(STOCH_D, stoch_d);
    out.set_column(VOLUME_MA, volume_ma);
    out.set_column(VOLUME_RATIO, volume_ratio);
    out.set_column(DAILY_RETURN, daily_return);
    out.set_column(LOG_RETURN, log_return);
    out.set_column(PRICE_CHANGE, price_change);
    out.set_column(HIGH_LOW, high_low);

    tracing::debug!(
        rows = out.len(),
        columns = out.names().len(),
        "Computed technical indicators"
    );
    Ok(out)
}

/// Simple-average RSI. The first row has no delta and counts as a zero move.
///
/// Zero average loss gives 100 when there was any gain; a completely flat
/// window has no defined RSI and yields `NaN`.
pub fn rsi(close: &[f64], period: usize) -> Vec<f64> {
    let mut gains = Vec::with_capacity(close.len());
    let mut losses = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let delta = if i == 0 { 0.0 } else { close[i] - close[i - 1] };
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }
    // Summed per window rather than with a running total: an all-zero loss
    // window must average to exactly 0.
    let avg_gain = rolling_series(&gains, period, RollingWindow::mean);
    let avg_loss = rolling_series(&losses, period, RollingWindow::mean);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if g.is_nan() || l.is_nan() {
                f64::NAN
            } else if l == 0.0 {
                if g > 0.0 {
                    100.0
                } else {
                    f64::NAN
                }
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            }
        })
        .collect()
}

/// Simple (non-Wilder) average of true range.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let true_range: Vec<f64> = (0..close.len())
        .map(|i| {
            let range = high[i] - low[i];
            if i == 0 {
                return range;
            }
            let prev = close[i - 1];
            range
                .max((high[i] - prev).abs())
                .max((low[i] - prev).abs())
        })
        .collect();
    sma_series(&true_range, period)
}

fn stochastic(high: &[f64], low: &[f64], close: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let lowest = rolling_series(low, STOCH_K_PERIOD, RollingWindow::min);
    let highest = rolling_series(high, STOCH_K_PERIOD, RollingWindow::max);
    let k: Vec<f64> = (0..close.len())
        .map(|i| 100.0 * (close[i] - lowest[i]) / (highest[i] - lowest[i]))
        .collect();
    // A flat window divides by zero; keep ±inf out of the %D average.
    let k_for_d: Vec<f64> = k
        .iter()
        .map(|v| if v.is_finite() { *v } else { f64::NAN })
        .collect();
    let d = sma_series(&k_for_d, STOCH_D_PERIOD);
    (k, d)
}
