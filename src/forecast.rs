use std::fmt;

use serde::Serialize;

use crate::ensemble::ModelPredictions;
use crate::error::ForecastError;
use crate::model::frame::{Frame, CLOSE};

pub const DEFAULT_HISTORY_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Strictly positive change is up; zero counts as down.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalWindow {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub current_price: f64,
    pub predicted_price: f64,
    pub all_predictions: ModelPredictions,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub direction: Direction,
    /// Magnitude of the predicted move in percent; not a statistical confidence.
    pub confidence: f64,
    pub data_points: usize,
    pub historical_data: HistoricalWindow,
}

/// Package clamped predictions with the clean history they came from.
pub fn assemble(
    predictions: ModelPredictions,
    current_price: f64,
    clean: &Frame,
    history_window: usize,
) -> Result<ForecastResult, ForecastError> {
    let closes = clean.require(CLOSE)?;
    let start = clean.len().saturating_sub(history_window);

    let price_change = predictions.ensemble - current_price;
    let price_change_pct = price_change / current_price * 100.0;

    Ok(ForecastResult {
        current_price,
        predicted_price: predictions.ensemble,
        all_predictions: predictions,
        price_change,
        price_change_pct,
        direction: Direction::from_change(price_change),
        confidence: price_change_pct.abs(),
        data_points: clean.len(),
        historical_data: HistoricalWindow {
            dates: clean.dates()[start..]
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
            prices: closes[start..].to_vec(),
        },
    })
}

/// Caller-facing envelope: the result fields plus `success`, or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<ForecastResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<ForecastResult, ForecastError>> for ForecastResponse {
    fn from(outcome: Result<ForecastResult, ForecastError>) -> Self {
        match outcome {
            Ok(result) => Self {
                success: true,
                result: Some(result),
                error: None,
            },
            Err(e) => Self {
                success: false,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}
