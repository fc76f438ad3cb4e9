//! Fitted models, scalers and training metadata, loaded once from a
//! directory of JSON files and shared read-only across requests.

pub mod linear;
pub mod scaler;
pub mod tree;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ensemble::{ModelKind, Predictor, Scaler};
use crate::error::ForecastError;

pub use linear::LinearModel;
pub use scaler::{MinMaxScaler, StandardScaler};
pub use tree::{Aggregation, RegressionTree, TreeEnsemble};

pub const SCALER_X_FILE: &str = "scaler_X.json";
pub const SCALER_Y_FILE: &str = "scaler_y.json";
pub const FEATURE_COLS_FILE: &str = "feature_cols.json";
pub const METADATA_FILE: &str = "model_metadata.json";

pub fn regressor_file(kind: ModelKind) -> String {
    format!("{}_model.json", kind.as_str())
}

pub fn required_files() -> Vec<String> {
    let mut files: Vec<String> = ModelKind::REGRESSORS.iter().map(|k| regressor_file(*k)).collect();
    files.extend(
        [SCALER_X_FILE, SCALER_Y_FILE, FEATURE_COLS_FILE, METADATA_FILE]
            .iter()
            .map(|f| f.to_string()),
    );
    files
}

/// Training-time summary shipped with the models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub best_model: String,
    pub num_features: usize,
    pub models_trained: Vec<String>,
    /// Validation metrics per model, e.g. `{"ridge": {"rmse": 812.4, "r2": 0.97}}`.
    #[serde(default)]
    pub results: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorSpec {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl RegressorSpec {
    pub fn build(self, n_features: usize) -> Result<Box<dyn Predictor>, ForecastError> {
        match self {
            Self::Linear(m) => {
                m.validate(n_features)?;
                Ok(Box::new(m))
            }
            Self::TreeEnsemble(mut m) => {
                m.validate(n_features)?;
                Ok(Box::new(m))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerSpec {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl ScalerSpec {
    pub fn build(self) -> Result<Box<dyn Scaler>, ForecastError> {
        match self {
            Self::Standard(s) => {
                s.validate()?;
                Ok(Box::new(s))
            }
            Self::MinMax(s) => {
                s.validate()?;
                Ok(Box::new(s))
            }
        }
    }
}

/// Everything one forecast needs from training. Immutable after load.
pub struct ModelBundle {
    pub xgboost: Box<dyn Predictor>,
    pub lightgbm: Box<dyn Predictor>,
    pub random_forest: Box<dyn Predictor>,
    pub ridge: Box<dyn Predictor>,
    pub scaler_x: Box<dyn Scaler>,
    pub scaler_y: Box<dyn Scaler>,
    pub feature_cols: Vec<String>,
    pub metadata: ModelMetadata,
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("feature_cols", &self.feature_cols)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl ModelBundle {
    pub fn regressor(&self, kind: ModelKind) -> Option<&dyn Predictor> {
        match kind {
            ModelKind::XgBoost => Some(self.xgboost.as_ref()),
            ModelKind::LightGbm => Some(self.lightgbm.as_ref()),
            ModelKind::RandomForest => Some(self.random_forest.as_ref()),
            ModelKind::Ridge => Some(self.ridge.as_ref()),
            ModelKind::Ensemble => None,
        }
    }

    /// Cross-check the pieces against each other.
    pub fn validate(&self) -> Result<(), ForecastError> {
        let n = self.feature_cols.len();
        if n == 0 {
            return Err(ForecastError::ModelStore("feature column list is empty".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.feature_cols.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ForecastError::ModelStore(format!(
                "feature column '{}' listed twice",
                dup
            )));
        }
        if self.scaler_x.width() != n {
            return Err(ForecastError::ModelStore(format!(
                "scaler_X fitted on {} columns, feature list has {}",
                self.scaler_x.width(),
                n
            )));
        }
        if self.scaler_y.width() != 1 {
            return Err(ForecastError::ModelStore(format!(
                "scaler_y must have exactly one column, has {}",
                self.scaler_y.width()
            )));
        }
        if self.metadata.num_features != n {
            return Err(ForecastError::ModelStore(format!(
                "metadata num_features is {}, feature list has {}",
                self.metadata.num_features, n
            )));
        }
        Ok(())
    }
}

/// Directory-backed loader for a [`ModelBundle`].
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files from [`required_files`] that are not present.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        required_files()
            .into_iter()
            .map(|f| self.dir.join(f))
            .filter(|p| !p.exists())
            .collect()
    }

    pub fn load(&self) -> Result<ModelBundle, ForecastError> {
        let missing = self.missing_files();
        if !missing.is_empty() {
            let list: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(ForecastError::ModelStore(format!(
                "missing model files: {}",
                list.join(", ")
            )));
        }

        let feature_cols: Vec<String> = self.read_json(FEATURE_COLS_FILE)?;
        let n = feature_cols.len();
        let regressor = |kind: ModelKind| -> Result<Box<dyn Predictor>, ForecastError> {
            let file = regressor_file(kind);
            let spec: RegressorSpec = self.read_json(&file)?;
            spec.build(n)
                .map_err(|e| ForecastError::ModelStore(format!("{}: {}", file, e)))
        };

        let bundle = ModelBundle {
            xgboost: regressor(ModelKind::XgBoost)?,
            lightgbm: regressor(ModelKind::LightGbm)?,
            random_forest: regressor(ModelKind::RandomForest)?,
            ridge: regressor(ModelKind::Ridge)?,
            scaler_x: self.read_json::<ScalerSpec>(SCALER_X_FILE)?.build()?,
            scaler_y: self.read_json::<ScalerSpec>(SCALER_Y_FILE)?.build()?,
            feature_cols,
            metadata: self.read_json(METADATA_FILE)?,
        };
        bundle.validate()?;

        tracing::info!(
            dir = %self.dir.display(),
            features = n,
            best_model = %bundle.metadata.best_model,
            "Loaded model bundle"
        );
        Ok(bundle)
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T, ForecastError> {
        let path = self.dir.join(file);
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            ForecastError::ModelStore(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ForecastError::ModelStore(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}
