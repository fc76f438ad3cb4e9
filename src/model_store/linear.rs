use serde::Deserialize;

use crate::ensemble::Predictor;
use crate::error::ForecastError;

/// `y = coef · x + intercept` (ridge, OLS, or any linear regressor).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn validate(&self, n_features: usize) -> Result<(), ForecastError> {
        if self.coef.len() != n_features {
            return Err(ForecastError::ModelStore(format!(
                "linear model has {} coefficients, feature list has {}",
                self.coef.len(),
                n_features
            )));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::ModelStore(
                "linear model has non-finite parameters".to_string(),
            ));
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64, ForecastError> {
        if features.len() != self.coef.len() {
            return Err(ForecastError::prediction(
                "linear",
                format!(
                    "expected {} features, got {}",
                    self.coef.len(),
                    features.len()
                ),
            ));
        }
        let dot: f64 = self.coef.iter().zip(features).map(|(c, x)| c * x).sum();
        Ok(dot + self.intercept)
    }
}
