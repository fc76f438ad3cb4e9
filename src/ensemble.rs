use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::features::FeatureVector;
use crate::model_store::ModelBundle;

/// A fitted regression model: one scaled feature row in, one scalar out.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, ForecastError>;
}

/// A fitted per-column normalization.
pub trait Scaler: Send + Sync {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError>;
    fn inverse_transform(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError>;

    /// Number of columns the scaler was fitted on.
    fn width(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelKind {
    XgBoost,
    LightGbm,
    RandomForest,
    Ridge,
    Ensemble,
}

impl ModelKind {
    pub const REGRESSORS: [ModelKind; 4] = [
        ModelKind::XgBoost,
        ModelKind::LightGbm,
        ModelKind::RandomForest,
        ModelKind::Ridge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XgBoost => "xgboost",
            Self::LightGbm => "lightgbm",
            Self::RandomForest => "random_forest",
            Self::Ridge => "ridge",
            Self::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per model, either in scaled space or in price space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPredictions {
    pub xgboost: f64,
    pub lightgbm: f64,
    pub random_forest: f64,
    pub ridge: f64,
    pub ensemble: f64,
}

impl ModelPredictions {
    pub fn get(&self, kind: ModelKind) -> f64 {
        match kind {
            ModelKind::XgBoost => self.xgboost,
            ModelKind::LightGbm => self.lightgbm,
            ModelKind::RandomForest => self.random_forest,
            ModelKind::Ridge => self.ridge,
            ModelKind::Ensemble => self.ensemble,
        }
    }

    pub fn iter_mut(&mut self) -> [(ModelKind, &mut f64); 5] {
        [
            (ModelKind::XgBoost, &mut self.xgboost),
            (ModelKind::LightGbm, &mut self.lightgbm),
            (ModelKind::RandomForest, &mut self.random_forest),
            (ModelKind::Ridge, &mut self.ridge),
            (ModelKind::Ensemble, &mut self.ensemble),
        ]
    }
}

/// Relative trust in each regressor. A tunable policy, not a fitted value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EnsembleWeights {
    pub xgboost: f64,
    pub lightgbm: f64,
    pub random_forest: f64,
    pub ridge: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            xgboost: 0.15,
            lightgbm: 0.15,
            random_forest: 0.20,
            ridge: 0.50,
        }
    }
}

impl EnsembleWeights {
    pub fn sum(&self) -> f64 {
        self.xgboost + self.lightgbm + self.random_forest + self.ridge
    }

    pub fn combine(&self, xgboost: f64, lightgbm: f64, random_forest: f64, ridge: f64) -> f64 {
        self.xgboost * xgboost
            + self.lightgbm * lightgbm
            + self.random_forest * random_forest
            + self.ridge * ridge
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnsemblePredictor {
    weights: EnsembleWeights,
}

impl EnsemblePredictor {
    pub fn new(weights: EnsembleWeights) -> Self {
        Self { weights }
    }

    /// Scaled-space prediction of every model plus the weighted ensemble.
    pub fn predict_scaled(
        &self,
        bundle: &ModelBundle,
        features: &FeatureVector,
    ) -> Result<ModelPredictions, ForecastError> {
        if features.len() != bundle.feature_cols.len() {
            return Err(ForecastError::prediction(
                "scaler_X",
                format!(
                    "feature vector has {} values, models expect {}",
                    features.len(),
                    bundle.feature_cols.len()
                ),
            ));
        }
        let scaled = bundle.scaler_x.transform(&features.values)?;

        let run = |kind: ModelKind| -> Result<f64, ForecastError> {
            let model = bundle.regressor(kind).ok_or_else(|| {
                ForecastError::prediction(kind.as_str(), "no regressor for this model kind")
            })?;
            let value = model.predict(&scaled).map_err(|e| match e {
                ForecastError::Prediction { msg, .. } => {
                    ForecastError::prediction(kind.as_str(), msg)
                }
                other => other,
            })?;
            if !value.is_finite() {
                return Err(ForecastError::prediction(
                    kind.as_str(),
                    format!("non-finite output {}", value),
                ));
            }
            Ok(value)
        };
        let xgboost = run(ModelKind::XgBoost)?;
        let lightgbm = run(ModelKind::LightGbm)?;
        let random_forest = run(ModelKind::RandomForest)?;
        let ridge = run(ModelKind::Ridge)?;

        Ok(ModelPredictions {
            xgboost,
            lightgbm,
            random_forest,
            ridge,
            ensemble: self.weights.combine(xgboost, lightgbm, random_forest, ridge),
        })
    }

    /// Full prediction bundle in price units. Each of the five scaled values is
    /// inverse-transformed on its own.
    pub fn predict(
        &self,
        bundle: &ModelBundle,
        features: &FeatureVector,
    ) -> Result<ModelPredictions, ForecastError> {
        let mut out = self.predict_scaled(bundle, features)?;
        for (kind, value) in out.iter_mut() {
            let restored = bundle.scaler_y.inverse_transform(&[*value])?;
            *value = match restored.as_slice() {
                [price] if price.is_finite() => *price,
                other => {
                    return Err(ForecastError::prediction(
                        "scaler_y",
                        format!("inverse transform of {} produced {:?}", kind, other),
                    ))
                }
            };
        }
        tracing::debug!(
            xgboost = out.xgboost,
            lightgbm = out.lightgbm,
            random_forest = out.random_forest,
            ridge = out.ridge,
            ensemble = out.ensemble,
            "Model predictions in price space"
        );
        Ok(out)
    }
}
