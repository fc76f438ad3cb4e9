use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ensemble::EnsembleWeights;
use crate::forecast::DEFAULT_HISTORY_WINDOW;
use crate::guard::DEFAULT_PLAUSIBILITY_BAND;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Yahoo,
    Binance,
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "binance" => Ok(Self::Binance),
            other => bail!("unknown data provider '{}', expected yahoo or binance", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub provider: Provider,
    pub yahoo_base_url: String,
    pub binance_base_url: String,
    pub symbol: String,
    pub days_back: u32,
    pub timeout_ms: u64,
}

impl DataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_band")]
    pub plausibility_band: f64,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default)]
    pub weights: EnsembleWeights,
}

fn default_band() -> f64 {
    DEFAULT_PLAUSIBILITY_BAND
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            plausibility_band: DEFAULT_PLAUSIBILITY_BAND,
            history_window: DEFAULT_HISTORY_WINDOW,
            weights: EnsembleWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.plausibility_band > 0.0 && self.plausibility_band < 1.0) {
            bail!(
                "forecast.plausibility_band must be in (0, 1), got {}",
                self.plausibility_band
            );
        }
        if self.history_window == 0 {
            bail!("forecast.history_window must be >= 1");
        }
        let w = &self.weights;
        for (name, v) in [
            ("xgboost", w.xgboost),
            ("lightgbm", w.lightgbm),
            ("random_forest", w.random_forest),
            ("ridge", w.ridge),
        ] {
            if !v.is_finite() || v < 0.0 {
                bail!("forecast.weights.{} must be a non-negative number, got {}", name, v);
            }
        }
        if (w.sum() - 1.0).abs() > 1e-9 {
            bail!("forecast.weights must sum to 1, got {}", w.sum());
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.data.timeout_ms == 0 {
            bail!("data.timeout_ms must be > 0");
        }
        if self.data.days_back == 0 {
            bail!("data.days_back must be >= 1");
        }
        if self.data.symbol.trim().is_empty() {
            bail!("data.symbol must not be empty");
        }
        self.forecast.validate()
    }

    /// Parse a TOML document and validate it. No environment overrides.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env`, read the config file, then apply environment overrides
    /// (`FORECAST_MODELS_DIR`, `FORECAST_DATA_PROVIDER`).
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if let Ok(dir) = std::env::var("FORECAST_MODELS_DIR") {
            if !dir.trim().is_empty() {
                config.models.dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(provider) = std::env::var("FORECAST_DATA_PROVIDER") {
            config.data.provider = provider
                .parse()
                .context("FORECAST_DATA_PROVIDER is invalid")?;
        }

        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }
}
