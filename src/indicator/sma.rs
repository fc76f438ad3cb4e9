/// Simple Moving Average using a ring buffer for O(1) push.
///
/// A `NaN` input empties the window: the average is only defined once
/// `period` consecutive values have been seen.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            period,
            buffer: vec![0.0; period],
            head: 0,
            count: 0,
            sum: 0.0,
        }
    }

    /// Push a new value, return the current SMA if enough data.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if value.is_nan() {
            self.reset();
            return None;
        }
        if self.count >= self.period {
            self.sum -= self.buffer[self.head];
        }
        self.buffer[self.head] = value;
        self.sum += value;
        self.head = (self.head + 1) % self.period;
        if self.count < self.period {
            self.count += 1;
        }
        if self.head == 0 && self.count >= self.period {
            // Resync once per lap so subtraction residue cannot accumulate.
            self.sum = self.buffer.iter().sum();
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.count >= self.period {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.head = 0;
        self.count = 0;
        self.sum = 0.0;
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Trailing simple mean of `values`, `NaN` where the window is not full.
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut sma = Sma::new(period);
    values
        .iter()
        .map(|&v| sma.push(v).unwrap_or(f64::NAN))
        .collect()
}
