use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::ForecastConfig;
use crate::data::DataSource;
use crate::ensemble::EnsemblePredictor;
use crate::error::ForecastError;
use crate::features::select_features;
use crate::forecast::{assemble, ForecastResult};
use crate::guard::PlausibilityGuard;
use crate::indicator::compute_indicators;
use crate::model::frame::{Frame, CLOSE};
use crate::model_store::ModelBundle;
use crate::sanitize::sanitize;

/// Request-scoped forecast over a shared, read-only model bundle.
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    bundle: Arc<ModelBundle>,
    ensemble: EnsemblePredictor,
    guard: PlausibilityGuard,
    history_window: usize,
}

impl ForecastPipeline {
    pub fn new(bundle: Arc<ModelBundle>, cfg: &ForecastConfig) -> Self {
        Self {
            bundle,
            ensemble: EnsemblePredictor::new(cfg.weights),
            guard: PlausibilityGuard::new(cfg.plausibility_band),
            history_window: cfg.history_window,
        }
    }

    /// Raw OHLCV frame in, forecast out. Pure: same input, same result.
    pub fn run(&self, raw: &Frame) -> Result<ForecastResult, ForecastError> {
        let mut features = compute_indicators(raw)?;
        sanitize(&mut features);
        let (clean, vector) = select_features(&features, &self.bundle.feature_cols)?;

        let current_price = clean
            .require(CLOSE)?
            .last()
            .copied()
            .ok_or(ForecastError::InsufficientData {
                available: raw.len(),
                required: crate::indicator::LONGEST_WINDOW,
            })?;
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(ForecastError::prediction(
                "current_price",
                format!("last close {} is not a positive price", current_price),
            ));
        }

        let mut predictions = self.ensemble.predict(&self.bundle, &vector)?;
        let clamped = self.guard.apply(&mut predictions, current_price);
        if !clamped.is_empty() {
            tracing::debug!(count = clamped.len(), "Predictions clamped to plausible range");
        }
        assemble(predictions, current_price, &clean, self.history_window)
    }

    /// Fetch history from `source` and run the pipeline on it.
    pub fn forecast(
        &self,
        source: &dyn DataSource,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ForecastResult, ForecastError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("forecast", %request_id, symbol, source = source.name());
        let _guard = span.enter();

        let outcome = source
            .fetch(symbol, start, end)
            .and_then(|raw| self.run(&raw));
        match &outcome {
            Ok(result) => tracing::info!(
                current_price = result.current_price,
                predicted_price = result.predicted_price,
                direction = %result.direction,
                change_pct = result.price_change_pct,
                data_points = result.data_points,
                "Forecast complete"
            ),
            Err(e) => tracing::error!(kind = e.kind(), error = %e, "Forecast failed"),
        }
        outcome
    }
}
