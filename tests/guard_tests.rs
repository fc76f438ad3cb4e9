use crypto_forecast::ensemble::{ModelKind, ModelPredictions};
use crypto_forecast::guard::PlausibilityGuard;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn out_of_band_predictions_are_clamped() {
    let mut p = ModelPredictions {
        xgboost: 150.0,
        lightgbm: 95.0,
        random_forest: 80.0,
        ridge: 100.0,
        ensemble: 110.0,
    };
    let events = PlausibilityGuard::default().apply(&mut p, 100.0);

    assert!(close(p.xgboost, 110.0));
    assert_eq!(p.lightgbm, 95.0);
    assert!(close(p.random_forest, 90.0));
    assert_eq!(p.ridge, 100.0);
    assert!(close(p.ensemble, 110.0));

    let models: Vec<ModelKind> = events.iter().map(|e| e.model).collect();
    assert!(models.contains(&ModelKind::XgBoost));
    assert!(models.contains(&ModelKind::RandomForest));
    assert!(!models.contains(&ModelKind::LightGbm));

    let xgb = events
        .iter()
        .find(|e| e.model == ModelKind::XgBoost)
        .unwrap();
    assert_eq!(xgb.raw, 150.0);
    assert!(close(xgb.adjustment(), -40.0));
}

#[test]
fn clamping_preserves_direction() {
    let mut p = ModelPredictions {
        xgboost: 1e6,
        lightgbm: 1e6,
        random_forest: 1e6,
        ridge: 1e6,
        ensemble: 1e6,
    };
    let events = PlausibilityGuard::default().apply(&mut p, 50_000.0);
    assert_eq!(events.len(), 5);
    assert!(p.ensemble > 50_000.0);
    assert!(close(p.ensemble, 55_000.0));
}

#[test]
fn everything_within_band_is_untouched() {
    let original = ModelPredictions {
        xgboost: 101.0,
        lightgbm: 99.0,
        random_forest: 109.0,
        ridge: 91.0,
        ensemble: 100.0,
    };
    let mut p = original;
    assert!(PlausibilityGuard::default().apply(&mut p, 100.0).is_empty());
    assert_eq!(p, original);
}

#[test]
fn custom_band_bounds() {
    let guard = PlausibilityGuard::new(0.05);
    let (low, high) = guard.bounds(200.0);
    assert!(close(low, 190.0));
    assert!(close(high, 210.0));
}

#[test]
#[should_panic(expected = "plausibility band must be in (0, 1)")]
fn band_must_be_a_fraction() {
    PlausibilityGuard::new(1.5);
}

#[test]
fn bounds_stay_ordered_for_negative_price() {
    let guard = PlausibilityGuard::default();
    let (low, high) = guard.bounds(-10.0);
    assert!(low <= high);
    assert!(close(low, -11.0));
    assert!(close(high, -9.0));

    let mut p = ModelPredictions {
        xgboost: 0.0,
        lightgbm: -10.0,
        random_forest: -20.0,
        ridge: -10.0,
        ensemble: -10.0,
    };
    let events = guard.apply(&mut p, -10.0);
    assert_eq!(events.len(), 2);
    assert!(close(p.xgboost, -9.0));
    assert!(close(p.random_forest, -11.0));
}
