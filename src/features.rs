use crate::error::ForecastError;
use crate::indicator::LONGEST_WINDOW;
use crate::model::frame::Frame;

/// The model input: one row's values in the model's training column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }
}

/// Drop every row that still has a missing cell.
pub fn clean_rows(frame: &Frame) -> Frame {
    frame.filter_rows(|i| frame.is_row_complete(i))
}

/// Project the last row of an already cleaned frame onto `feature_cols`.
pub fn select_latest(clean: &Frame, feature_cols: &[String]) -> Result<FeatureVector, ForecastError> {
    let Some(last) = clean.len().checked_sub(1) else {
        return Err(ForecastError::InsufficientData {
            available: 0,
            required: LONGEST_WINDOW,
        });
    };

    let missing: Vec<String> = feature_cols
        .iter()
        .filter(|name| clean.column(name).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ForecastError::SchemaMismatch { missing });
    }

    let values = feature_cols
        .iter()
        .filter_map(|name| clean.column(name))
        .map(|col| col[last])
        .collect();
    Ok(FeatureVector {
        names: feature_cols.to_vec(),
        values,
    })
}

/// Clean the sanitized frame and take its most recent complete row.
///
/// Returns the clean frame too; it feeds the historical window and row count.
pub fn select_features(
    sanitized: &Frame,
    feature_cols: &[String],
) -> Result<(Frame, FeatureVector), ForecastError> {
    let clean = clean_rows(sanitized);
    if clean.is_empty() {
        return Err(ForecastError::InsufficientData {
            available: sanitized.len(),
            required: LONGEST_WINDOW,
        });
    }
    let vector = select_latest(&clean, feature_cols)?;
    tracing::debug!(
        rows = clean.len(),
        dropped = sanitized.len() - clean.len(),
        features = vector.len(),
        "Selected latest feature row"
    );
    Ok((clean, vector))
}
