use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crypto_forecast::config::{Config, Provider, DEFAULT_CONFIG_PATH};
use crypto_forecast::data::{BinanceKlineSource, DataSource, YahooChartSource};
use crypto_forecast::indicator::{indicator_catalog, IndicatorCatalog};
use crypto_forecast::model_store::{ModelBundle, ModelStore};
use crypto_forecast::{ForecastPipeline, ForecastResponse};

#[derive(Debug, Parser)]
#[command(name = "crypto-forecast", version, about = "Next-day price forecast from daily OHLCV bars")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Forecast the next daily close for a symbol.
    Predict {
        #[arg(long)]
        symbol: Option<String>,
        /// Days of history to fetch.
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, value_enum)]
        provider: Option<Provider>,
    },
    /// List the indicator columns the feature engine produces.
    Indicators,
    /// Show training metadata of the loaded models.
    Models,
    /// Report whether the model bundle loads.
    Health,
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    // stdout is reserved for result JSON.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[derive(Serialize)]
struct IndicatorsResponse {
    success: bool,
    #[serde(flatten)]
    catalog: IndicatorCatalog,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

fn load_bundle(config: &Config) -> Result<ModelBundle> {
    let store = ModelStore::new(&config.models.dir);
    store
        .load()
        .with_context(|| format!("failed to load models from {}", store.dir().display()))
}

fn build_source(config: &Config, provider: Provider) -> Result<Box<dyn DataSource>> {
    let timeout = config.data.timeout();
    Ok(match provider {
        Provider::Yahoo => Box::new(YahooChartSource::new(&config.data.yahoo_base_url, timeout)?),
        Provider::Binance => {
            Box::new(BinanceKlineSource::new(&config.data.binance_base_url, timeout)?)
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    match cli.command {
        Command::Predict {
            symbol,
            days,
            provider,
        } => {
            let bundle = Arc::new(load_bundle(&config)?);
            let pipeline = ForecastPipeline::new(bundle, &config.forecast);
            let symbol = symbol.unwrap_or_else(|| config.data.symbol.clone());
            let days = days.unwrap_or(config.data.days_back).max(1);
            let source = build_source(&config, provider.unwrap_or(config.data.provider))?;

            let end = chrono::Utc::now().date_naive();
            let start = end - chrono::Duration::days(i64::from(days));
            tracing::info!(symbol = %symbol, days, %start, %end, "Starting forecast");

            let response = ForecastResponse::from(pipeline.forecast(source.as_ref(), &symbol, start, end));
            print_json(&response)?;
            if !response.success {
                std::process::exit(1);
            }
        }
        Command::Indicators => {
            print_json(&IndicatorsResponse {
                success: true,
                catalog: indicator_catalog(),
            })?;
        }
        Command::Models => {
            let bundle = load_bundle(&config)?;
            let meta = &bundle.metadata;
            print_json(&serde_json::json!({
                "success": true,
                "models": meta.models_trained,
                "best_model": meta.best_model,
                "num_features": meta.num_features,
                "results": meta.results,
            }))?;
        }
        Command::Health => {
            let models_loaded = match load_bundle(&config) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(error = %format!("{:#}", e), "Model bundle not loadable");
                    false
                }
            };
            print_json(&serde_json::json!({
                "status": "healthy",
                "models_loaded": models_loaded,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))?;
        }
    }
    Ok(())
}
