use crate::ensemble::{ModelKind, ModelPredictions};

pub const DEFAULT_PLAUSIBILITY_BAND: f64 = 0.10;

/// One prediction pulled back into the plausible range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampEvent {
    pub model: ModelKind,
    pub raw: f64,
    pub clamped: f64,
}

impl ClampEvent {
    pub fn adjustment(&self) -> f64 {
        self.clamped - self.raw
    }
}

/// Caps every predicted price to `current × (1 ± band)`.
///
/// Short-horizon moves beyond the band are treated as model extrapolation. The
/// direction of the signal survives; only its magnitude is capped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibilityGuard {
    band: f64,
}

impl Default for PlausibilityGuard {
    fn default() -> Self {
        Self::new(DEFAULT_PLAUSIBILITY_BAND)
    }
}

impl PlausibilityGuard {
    pub fn new(band: f64) -> Self {
        assert!(
            band > 0.0 && band < 1.0,
            "plausibility band must be in (0, 1)"
        );
        Self { band }
    }

    /// `(low, high)`, ordered even for a non-positive price.
    pub fn bounds(&self, current_price: f64) -> (f64, f64) {
        let a = current_price * (1.0 - self.band);
        let b = current_price * (1.0 + self.band);
        (a.min(b), a.max(b))
    }

    /// Clamp in place; one warning per clamped value.
    pub fn apply(&self, predictions: &mut ModelPredictions, current_price: f64) -> Vec<ClampEvent> {
        let (low, high) = self.bounds(current_price);
        let mut events = Vec::new();
        for (model, value) in predictions.iter_mut() {
            let raw = *value;
            if raw >= low && raw <= high {
                continue;
            }
            let clamped = raw.max(low).min(high);
            *value = clamped;
            let event = ClampEvent {
                model,
                raw,
                clamped,
            };
            tracing::warn!(
                model = %model,
                raw,
                clamped,
                adjustment = event.adjustment(),
                low,
                high,
                band = self.band,
                "Prediction outside plausible range, clamping"
            );
            events.push(event);
        }
        events
    }
}
