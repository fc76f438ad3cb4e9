mod common;

use crypto_forecast::features::{clean_rows, select_features};
use crypto_forecast::indicator::compute_indicators;
use crypto_forecast::model::Frame;
use crypto_forecast::sanitize::sanitize;
use crypto_forecast::ForecastError;

use common::{all_feature_cols, wave_candles};

fn sanitized(n: usize) -> Frame {
    let mut f = compute_indicators(&Frame::from_candles(&wave_candles(n))).unwrap();
    sanitize(&mut f);
    f
}

#[test]
fn fewer_than_fifty_rows_is_insufficient() {
    let err = select_features(&sanitized(49), &all_feature_cols()).unwrap_err();
    match err {
        ForecastError::InsufficientData {
            available,
            required,
        } => {
            assert_eq!(available, 49);
            assert_eq!(required, 50);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn fifty_rows_is_enough() {
    let (clean, vector) = select_features(&sanitized(50), &all_feature_cols()).unwrap();
    assert_eq!(clean.len(), 50);
    assert_eq!(vector.len(), all_feature_cols().len());
}

#[test]
fn vector_follows_requested_order_and_uses_last_row() {
    let frame = sanitized(90);
    let cols = vec![
        "RSI_14".to_string(),
        "Close".to_string(),
        "MACD".to_string(),
    ];
    let (_, vector) = select_features(&frame, &cols).unwrap();
    assert_eq!(vector.names, cols);
    assert_eq!(vector.values[0], frame.column("RSI_14").unwrap()[89]);
    assert_eq!(vector.values[1], frame.column("Close").unwrap()[89]);
    assert_eq!(vector.values[2], frame.column("MACD").unwrap()[89]);
    assert_eq!(vector.get("Close"), Some(vector.values[1]));
}

#[test]
fn unknown_columns_are_all_reported() {
    let cols = vec![
        "Close".to_string(),
        "OBV".to_string(),
        "ADX_14".to_string(),
    ];
    match select_features(&sanitized(60), &cols).unwrap_err() {
        ForecastError::SchemaMismatch { missing } => {
            assert_eq!(missing, vec!["OBV".to_string(), "ADX_14".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn clean_rows_drops_only_warm_up_rows() {
    let raw = compute_indicators(&Frame::from_candles(&wave_candles(60))).unwrap();
    let clean = clean_rows(&raw);
    // SMA_50 is the last column to fill, at row 49.
    assert_eq!(clean.len(), 11);
    assert_eq!(clean.dates()[0], raw.dates()[49]);
    assert_eq!(clean.dates().last(), raw.dates().last());
}
