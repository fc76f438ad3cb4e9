pub mod catalog;
pub mod ema;
pub mod engine;
pub mod sma;
pub mod window;

pub use catalog::{indicator_catalog, IndicatorCatalog, IndicatorGroup};
pub use engine::{compute_indicators, LONGEST_WINDOW};
