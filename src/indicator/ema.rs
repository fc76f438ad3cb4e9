/// Exponential Moving Average with `alpha = 2 / (span + 1)`.
///
/// Seeded with the first value and updated recursively from there, so it
/// yields a value from the very first push (no warm-up, no bias correction).
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    ema: Option<f64>,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "EMA span must be > 0");
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            ema: None,
        }
    }

    /// Push a new value and return the updated EMA.
    ///
    /// A `NaN` input leaves the running value unchanged.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if value.is_nan() {
            return self.ema;
        }
        let next = match self.ema {
            Some(prev) => prev + self.alpha * (value - prev),
            None => value,
        };
        self.ema = Some(next);
        self.ema
    }

    pub fn value(&self) -> Option<f64> {
        self.ema
    }

    pub fn is_ready(&self) -> bool {
        self.ema.is_some()
    }
}

pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut ema = Ema::new(span);
    values
        .iter()
        .map(|&v| ema.push(v).unwrap_or(f64::NAN))
        .collect()
}
