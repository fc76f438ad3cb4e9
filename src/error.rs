use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("insufficient data: {available} rows of history, no complete feature row (need at least {required})")]
    InsufficientData { available: usize, required: usize },

    #[error("feature schema mismatch: missing column(s) {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("prediction error ({stage}): {msg}")]
    Prediction { stage: String, msg: String },

    #[error("data source error: {0}")]
    DataSource(String),

    #[error("model store error: {0}")]
    ModelStore(String),
}

impl ForecastError {
    pub fn prediction(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Prediction {
            stage: stage.into(),
            msg: msg.into(),
        }
    }

    /// Stable tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::Prediction { .. } => "prediction",
            Self::DataSource(_) => "data_source",
            Self::ModelStore(_) => "model_store",
        }
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::DataSource(format!("request timed out: {}", e))
        } else {
            Self::DataSource(e.to_string())
        }
    }
}
