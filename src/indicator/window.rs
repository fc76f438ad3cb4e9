use std::collections::VecDeque;

/// Fixed-length trailing window for statistics that need every element
/// (extremes, dispersion). A `NaN` input empties the window.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "window period must be > 0");
        Self {
            period,
            values: VecDeque::with_capacity(period),
        }
    }

    /// Push a value; returns true once the window holds `period` values.
    pub fn push(&mut self, value: f64) -> bool {
        if value.is_nan() {
            self.values.clear();
            return false;
        }
        self.values.push_back(value);
        while self.values.len() > self.period {
            let _ = self.values.pop_front();
        }
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.period
    }

    pub fn min(&self) -> Option<f64> {
        self.is_full()
            .then(|| self.values.iter().fold(f64::INFINITY, |acc, v| acc.min(*v)))
    }

    pub fn max(&self) -> Option<f64> {
        self.is_full()
            .then(|| self.values.iter().fold(f64::NEG_INFINITY, |acc, v| acc.max(*v)))
    }

    pub fn mean(&self) -> Option<f64> {
        self.is_full()
            .then(|| self.values.iter().sum::<f64>() / self.period as f64)
    }

    /// Population standard deviation (divides by `period`).
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self
            .values
            .iter()
            .map(|v| {
                let d = *v - mean;
                d * d
            })
            .sum::<f64>()
            / self.period as f64;
        Some(variance.sqrt())
    }
}

/// Apply `stat` to a trailing window over `values`, `NaN` until it fills.
pub fn rolling_series(
    values: &[f64],
    period: usize,
    stat: impl Fn(&RollingWindow) -> Option<f64>,
) -> Vec<f64> {
    let mut window = RollingWindow::new(period);
    values
        .iter()
        .map(|&v| {
            window.push(v);
            stat(&window).unwrap_or(f64::NAN)
        })
        .collect()
}
