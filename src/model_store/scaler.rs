use serde::Deserialize;

use crate::ensemble::Scaler;
use crate::error::ForecastError;

fn check_width(stage: &str, expected: usize, row: &[f64]) -> Result<(), ForecastError> {
    if row.len() != expected {
        return Err(ForecastError::prediction(
            stage,
            format!("scaler fitted on {} columns, got {}", expected, row.len()),
        ));
    }
    Ok(())
}

fn check_params(name: &str, offset: &[f64], scale: &[f64]) -> Result<(), ForecastError> {
    if offset.len() != scale.len() || offset.is_empty() {
        return Err(ForecastError::ModelStore(format!(
            "{} scaler needs equal, non-empty parameter arrays ({} vs {})",
            name,
            offset.len(),
            scale.len()
        )));
    }
    if offset.iter().any(|v| !v.is_finite()) || scale.iter().any(|v| !v.is_finite() || *v == 0.0) {
        return Err(ForecastError::ModelStore(format!(
            "{} scaler has a zero or non-finite parameter",
            name
        )));
    }
    Ok(())
}

/// Standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn validate(&self) -> Result<(), ForecastError> {
        check_params("standard", &self.mean, &self.scale)
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        check_width("standard_scaler", self.mean.len(), row)?;
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    fn inverse_transform(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        check_width("standard_scaler", self.mean.len(), row)?;
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(z, (m, s))| z * s + m)
            .collect())
    }

    fn width(&self) -> usize {
        self.mean.len()
    }
}

/// Range scaling in fitted form: `x * scale + min`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl MinMaxScaler {
    pub fn validate(&self) -> Result<(), ForecastError> {
        check_params("min_max", &self.min, &self.scale)
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        check_width("min_max_scaler", self.min.len(), row)?;
        Ok(row
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(x, (m, s))| x * s + m)
            .collect())
    }

    fn inverse_transform(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        check_width("min_max_scaler", self.min.len(), row)?;
        Ok(row
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(z, (m, s))| (z - m) / s)
            .collect())
    }

    fn width(&self) -> usize {
        self.min.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scaler_values() {
        let s = StandardScaler {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 0.5],
        };
        assert_eq!(s.transform(&[14.0, 1.0]).unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn zero_scale_rejected() {
        let s = MinMaxScaler {
            min: vec![0.0],
            scale: vec![0.0],
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn wrong_width_is_prediction_error() {
        let s = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert!(matches!(
            s.transform(&[1.0]),
            Err(ForecastError::Prediction { .. })
        ));
    }
}
