//! Next-day price forecasting from daily OHLCV bars.
//!
//! ```text
//! DataSource → indicator → sanitize → features → ensemble → guard → forecast
//!                                                   ↑
//!                                       ModelBundle (loaded once, shared)
//! ```

pub mod config;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod forecast;
pub mod guard;
pub mod indicator;
pub mod model;
pub mod model_store;
pub mod pipeline;
pub mod sanitize;

pub use error::ForecastError;
pub use forecast::{Direction, ForecastResponse, ForecastResult};
pub use pipeline::ForecastPipeline;
