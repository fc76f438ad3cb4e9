use crate::indicator::engine::{DAILY_RETURN, LOG_RETURN, VOLUME_RATIO};
use crate::model::frame::Frame;

/// Inclusive value range enforced on one column after gap filling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampRule {
    pub column: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const CLAMP_RULES: [ClampRule; 3] = [
    ClampRule {
        column: VOLUME_RATIO,
        min: 0.0,
        max: 10.0,
    },
    ClampRule {
        column: DAILY_RETURN,
        min: -0.9,
        max: 1.0,
    },
    ClampRule {
        column: LOG_RETURN,
        min: -2.5,
        max: 2.5,
    },
];

/// Clean a feature frame in place. The step order matters:
/// infinities become gaps, gaps are forward- then backward-filled per column,
/// and only then are the ratio/return columns clamped.
pub fn sanitize(frame: &mut Frame) {
    let mut replaced = 0usize;
    for (_, col) in frame.columns_mut() {
        replaced += replace_infinite(col);
        forward_fill(col);
        backward_fill(col);
    }
    for rule in CLAMP_RULES {
        if let Some(col) = frame.column_mut(rule.column) {
            clamp(col, rule.min, rule.max);
        }
    }
    if replaced > 0 {
        tracing::debug!(replaced, "Replaced infinite indicator values");
    }
}

fn replace_infinite(values: &mut [f64]) -> usize {
    let mut n = 0;
    for v in values.iter_mut().filter(|v| v.is_infinite()) {
        *v = f64::NAN;
        n += 1;
    }
    n
}

pub fn forward_fill(values: &mut [f64]) {
    let mut last = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }
}

pub fn backward_fill(values: &mut [f64]) {
    let mut next = f64::NAN;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            *v = next;
        } else {
            next = *v;
        }
    }
}

/// `NaN` stays `NaN`: a column with no valid value at all is not invented.
fn clamp(values: &mut [f64], min: f64, max: f64) {
    for v in values.iter_mut().filter(|v| !v.is_nan()) {
        *v = v.clamp(min, max);
    }
}
