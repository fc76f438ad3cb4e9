#![allow(dead_code)]

use chrono::{Duration, NaiveDate};

use crypto_forecast::ensemble::{Predictor, Scaler};
use crypto_forecast::indicator::indicator_catalog;
use crypto_forecast::model::Candle;
use crypto_forecast::model_store::{ModelBundle, ModelMetadata, StandardScaler};
use crypto_forecast::ForecastError;

pub fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(i as i64)
}

fn bar(i: usize, open: f64, close: f64, volume: f64) -> Candle {
    Candle {
        date: day(i),
        open,
        high: open.max(close) + 1.0,
        low: open.min(close) - 1.0,
        close,
        volume,
    }
}

/// Deterministic wavy series with a slow drift.
pub fn wave_candles(n: usize) -> Vec<Candle> {
    let mut out = Vec::with_capacity(n);
    let mut prev = 100.0;
    for i in 0..n {
        let close = 100.0 + 10.0 * (i as f64 / 7.0).sin() + i as f64 * 0.05;
        out.push(bar(i, prev, close, 1_000.0 + 100.0 * (i % 5) as f64));
        prev = close;
    }
    out
}

/// `n` days where the last `flat` days sit exactly at 100.
pub fn flat_tail_candles(n: usize, flat: usize) -> Vec<Candle> {
    let mut out = wave_candles(n - flat);
    for i in (n - flat)..n {
        out.push(Candle {
            date: day(i),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume: 1_000.0,
        });
    }
    out
}

pub fn rising_candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 50.0 + i as f64;
            bar(i, close - 0.5, close, 500.0)
        })
        .collect()
}

/// Raw OHLCV columns followed by every indicator column.
pub fn all_feature_cols() -> Vec<String> {
    let mut cols: Vec<String> = ["Open", "High", "Low", "Close", "Volume"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for group in indicator_catalog().groups {
        cols.extend(group.columns.iter().map(|c| c.to_string()));
    }
    cols
}

pub struct Constant(pub f64);

impl Predictor for Constant {
    fn predict(&self, _features: &[f64]) -> Result<f64, ForecastError> {
        Ok(self.0)
    }
}

/// Echoes one input feature.
pub struct Pick(pub usize);

impl Predictor for Pick {
    fn predict(&self, features: &[f64]) -> Result<f64, ForecastError> {
        features
            .get(self.0)
            .copied()
            .ok_or_else(|| ForecastError::prediction("pick", "index out of range"))
    }
}

pub struct Failing;

impl Predictor for Failing {
    fn predict(&self, features: &[f64]) -> Result<f64, ForecastError> {
        Err(ForecastError::prediction(
            "test",
            format!("shape mismatch for {} features", features.len()),
        ))
    }
}

pub fn identity_scaler(width: usize) -> StandardScaler {
    StandardScaler {
        mean: vec![0.0; width],
        scale: vec![1.0; width],
    }
}

pub fn bundle(
    feature_cols: Vec<String>,
    models: [Box<dyn Predictor>; 4],
    scaler_y: Box<dyn Scaler>,
) -> ModelBundle {
    let n = feature_cols.len();
    let [xgboost, lightgbm, random_forest, ridge] = models;
    ModelBundle {
        xgboost,
        lightgbm,
        random_forest,
        ridge,
        scaler_x: Box::new(identity_scaler(n)),
        scaler_y,
        feature_cols,
        metadata: ModelMetadata {
            best_model: "ridge".to_string(),
            num_features: n,
            models_trained: vec![
                "xgboost".to_string(),
                "lightgbm".to_string(),
                "random_forest".to_string(),
                "ridge".to_string(),
            ],
            results: Default::default(),
        },
    }
}

/// Every model echoes the close, with identity scaling on both sides.
pub fn close_echo_bundle() -> ModelBundle {
    let cols = all_feature_cols();
    let close_idx = cols.iter().position(|c| c == "Close").unwrap();
    bundle(
        cols,
        [
            Box::new(Pick(close_idx)),
            Box::new(Pick(close_idx)),
            Box::new(Pick(close_idx)),
            Box::new(Pick(close_idx)),
        ],
        Box::new(identity_scaler(1)),
    )
}
