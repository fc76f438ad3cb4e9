use chrono::NaiveDate;

use crate::error::ForecastError;
use crate::model::candle::Candle;

pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";

/// Column-oriented daily table: one date per row, any number of named `f64`
/// columns. `NaN` marks a missing cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    dates: Vec<NaiveDate>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Frame {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Raw OHLCV table with the canonical column names.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut frame = Self::new(candles.iter().map(|c| c.date).collect());
        frame.set_column(OPEN, candles.iter().map(|c| c.open).collect());
        frame.set_column(HIGH, candles.iter().map(|c| c.high).collect());
        frame.set_column(LOW, candles.iter().map(|c| c.low).collect());
        frame.set_column(CLOSE, candles.iter().map(|c| c.close).collect());
        frame.set_column(VOLUME, candles.iter().map(|c| c.volume).collect());
        frame
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index_of(name).map(|i| self.columns[i].as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.index_of(name).map(move |i| &mut self.columns[i])
    }

    /// Column lookup that reports a missing column as a schema error.
    pub fn require(&self, name: &str) -> Result<&[f64], ForecastError> {
        self.column(name).ok_or_else(|| {
            ForecastError::Schema(format!(
                "missing required column '{}' (available: {})",
                name,
                self.names.join(", ")
            ))
        })
    }

    /// Insert a column, or replace it in place if the name already exists.
    ///
    /// Panics if `values` is not one value per row.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        assert_eq!(
            values.len(),
            self.dates.len(),
            "column '{}' length must match row count",
            name
        );
        match self.index_of(&name) {
            Some(i) => self.columns[i] = values,
            None => {
                self.names.push(name);
                self.columns.push(values);
            }
        }
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<f64>)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter_mut())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// True when no cell of row `idx` is `NaN`.
    pub fn is_row_complete(&self, idx: usize) -> bool {
        self.columns.iter().all(|col| !col[idx].is_nan())
    }

    /// New frame with only the rows for which `keep` returns true, order preserved.
    pub fn filter_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Frame {
        let rows: Vec<usize> = (0..self.len()).filter(|&i| keep(i)).collect();
        Frame {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| rows.iter().map(|&i| col[i]).collect())
                .collect(),
        }
    }

    /// Dates must be strictly increasing (chronological, no duplicates).
    pub fn check_chronological(&self) -> Result<(), ForecastError> {
        if let Some(w) = self.dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ForecastError::Schema(format!(
                "dates must be strictly increasing, found {} followed by {}",
                w[0], w[1]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn set_column_replaces_existing() {
        let mut f = Frame::new(vec![day(1), day(2)]);
        f.set_column("A", vec![1.0, 2.0]);
        f.set_column("B", vec![3.0, 4.0]);
        f.set_column("A", vec![5.0, 6.0]);
        assert_eq!(f.names(), &["A".to_string(), "B".to_string()]);
        assert_eq!(f.column("A").unwrap(), &[5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "length must match row count")]
    fn set_column_rejects_wrong_length() {
        let mut f = Frame::new(vec![day(1), day(2)]);
        f.set_column("A", vec![1.0]);
    }

    #[test]
    fn require_reports_schema_error() {
        let f = Frame::new(vec![day(1)]);
        let err = f.require("Close").unwrap_err();
        assert!(matches!(err, ForecastError::Schema(_)));
    }

    #[test]
    fn filter_rows_preserves_order() {
        let mut f = Frame::new(vec![day(1), day(2), day(3)]);
        f.set_column("A", vec![f64::NAN, 2.0, 3.0]);
        let clean = f.filter_rows(|i| f.is_row_complete(i));
        assert_eq!(clean.dates(), &[day(2), day(3)]);
        assert_eq!(clean.column("A").unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn chronological_check_rejects_duplicates() {
        assert!(Frame::new(vec![day(1), day(2)]).check_chronological().is_ok());
        assert!(Frame::new(vec![day(1), day(1)]).check_chronological().is_err());
        assert!(Frame::new(vec![day(2), day(1)]).check_chronological().is_err());
    }
}
