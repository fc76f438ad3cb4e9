use serde::{Serialize, Serializer};

use super::engine::*;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndicatorGroup {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
}

/// Serializes as `{"indicators": {group: [columns]}, "total_indicators": n}`,
/// groups in catalog order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndicatorCatalog {
    #[serde(rename = "indicators", serialize_with = "groups_as_map")]
    pub groups: Vec<IndicatorGroup>,
    pub total_indicators: usize,
}

fn groups_as_map<S: Serializer>(groups: &[IndicatorGroup], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(groups.iter().map(|g| (g.name, &g.columns)))
}

/// Indicator columns produced by [`compute_indicators`], grouped by family.
pub fn indicator_catalog() -> IndicatorCatalog {
    let groups = vec![
        IndicatorGroup {
            name: "Moving Averages",
            columns: vec![SMA_10, SMA_20, SMA_50, EMA_12, EMA_26],
        },
        IndicatorGroup {
            name: "Momentum",
            columns: vec![RSI_14, MACD, MACD_SIGNAL, MACD_DIFF],
        },
        IndicatorGroup {
            name: "Volatility",
            columns: vec![ATR_14, BB_UPPER, BB_LOWER, BB_MIDDLE],
        },
        IndicatorGroup {
            name: "Stochastic",
            columns: vec![STOCH_K, STOCH_D],
        },
        IndicatorGroup {
            name: "Volume",
            columns: vec![VOLUME_MA, VOLUME_RATIO],
        },
        IndicatorGroup {
            name: "Returns",
            columns: vec![DAILY_RETURN, LOG_RETURN, PRICE_CHANGE, HIGH_LOW],
        },
    ];
    let total_indicators = groups.iter().map(|g| g.columns.len()).sum();
    IndicatorCatalog {
        groups,
        total_indicators,
    }
}
