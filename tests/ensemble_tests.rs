mod common;

use crypto_forecast::ensemble::{EnsemblePredictor, EnsembleWeights, Scaler};
use crypto_forecast::features::FeatureVector;
use crypto_forecast::model_store::{MinMaxScaler, StandardScaler};
use crypto_forecast::ForecastError;

use common::{bundle, identity_scaler, Constant, Failing};

fn cols(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("f{}", i)).collect()
}

fn vector(values: Vec<f64>) -> FeatureVector {
    FeatureVector {
        names: cols(values.len()),
        values,
    }
}

#[test]
fn ensemble_score_is_fixed_weighted_sum() {
    let b = bundle(
        cols(2),
        [
            Box::new(Constant(1.0)),
            Box::new(Constant(2.0)),
            Box::new(Constant(3.0)),
            Box::new(Constant(4.0)),
        ],
        Box::new(identity_scaler(1)),
    );
    let scaled = EnsemblePredictor::default()
        .predict_scaled(&b, &vector(vec![0.0, 0.0]))
        .unwrap();
    assert_eq!(scaled.xgboost, 1.0);
    assert_eq!(scaled.ridge, 4.0);
    assert_eq!(scaled.ensemble, 0.15 * 1.0 + 0.15 * 2.0 + 0.20 * 3.0 + 0.50 * 4.0);
}

#[test]
fn each_output_is_inverse_scaled_independently() {
    let scaler_y = StandardScaler {
        mean: vec![100.0],
        scale: vec![10.0],
    };
    let b = bundle(
        cols(1),
        [
            Box::new(Constant(1.0)),
            Box::new(Constant(-1.0)),
            Box::new(Constant(0.5)),
            Box::new(Constant(0.0)),
        ],
        Box::new(scaler_y),
    );
    let p = EnsemblePredictor::default()
        .predict(&b, &vector(vec![3.0]))
        .unwrap();
    assert!((p.xgboost - 110.0).abs() < 1e-9);
    assert!((p.lightgbm - 90.0).abs() < 1e-9);
    assert!((p.random_forest - 105.0).abs() < 1e-9);
    assert!((p.ridge - 100.0).abs() < 1e-9);
    // scaled ensemble = 0.15 - 0.15 + 0.10 + 0 = 0.10 -> 101
    assert!((p.ensemble - 101.0).abs() < 1e-9);
}

#[test]
fn custom_weights_are_applied() {
    let weights = EnsembleWeights {
        xgboost: 0.0,
        lightgbm: 0.0,
        random_forest: 0.0,
        ridge: 1.0,
    };
    let b = bundle(
        cols(1),
        [
            Box::new(Constant(9.0)),
            Box::new(Constant(9.0)),
            Box::new(Constant(9.0)),
            Box::new(Constant(2.0)),
        ],
        Box::new(identity_scaler(1)),
    );
    let p = EnsemblePredictor::new(weights)
        .predict(&b, &vector(vec![0.0]))
        .unwrap();
    assert_eq!(p.ensemble, 2.0);
}

#[test]
fn one_failing_model_fails_the_request() {
    let b = bundle(
        cols(1),
        [
            Box::new(Constant(1.0)),
            Box::new(Constant(1.0)),
            Box::new(Failing),
            Box::new(Constant(1.0)),
        ],
        Box::new(identity_scaler(1)),
    );
    match EnsemblePredictor::default().predict(&b, &vector(vec![0.0])) {
        Err(ForecastError::Prediction { stage, msg }) => {
            assert_eq!(stage, "random_forest");
            assert!(msg.contains("shape mismatch"));
        }
        other => panic!("expected PredictionError, got {:?}", other),
    }
}

#[test]
fn non_finite_model_output_is_prediction_error() {
    let b = bundle(
        cols(1),
        [
            Box::new(Constant(f64::NAN)),
            Box::new(Constant(1.0)),
            Box::new(Constant(1.0)),
            Box::new(Constant(1.0)),
        ],
        Box::new(identity_scaler(1)),
    );
    assert!(matches!(
        EnsemblePredictor::default().predict(&b, &vector(vec![0.0])),
        Err(ForecastError::Prediction { .. })
    ));
}

#[test]
fn feature_count_mismatch_is_prediction_error() {
    let b = bundle(
        cols(3),
        [
            Box::new(Constant(1.0)),
            Box::new(Constant(1.0)),
            Box::new(Constant(1.0)),
            Box::new(Constant(1.0)),
        ],
        Box::new(identity_scaler(1)),
    );
    assert!(matches!(
        EnsemblePredictor::default().predict(&b, &vector(vec![0.0, 1.0])),
        Err(ForecastError::Prediction { .. })
    ));
}

#[test]
fn scalers_round_trip() {
    let row = vec![42_000.0, 0.035, -1.7, 65.0];
    let standard = StandardScaler {
        mean: vec![30_000.0, 0.001, 0.0, 50.0],
        scale: vec![8_000.0, 0.04, 1.2, 18.0],
    };
    let min_max = MinMaxScaler {
        min: vec![-0.5, 0.2, 0.5, -0.1],
        scale: vec![1.0 / 60_000.0, 5.0, 0.25, 0.01],
    };
    for scaler in [&standard as &dyn Scaler, &min_max as &dyn Scaler] {
        let back = scaler
            .inverse_transform(&scaler.transform(&row).unwrap())
            .unwrap();
        for (a, b) in row.iter().zip(&back) {
            assert!((a - b).abs() < 1e-9 * a.abs().max(1.0), "{} vs {}", a, b);
        }
    }
}
