use super::common::*;
use crate::scoring::{
    calibrate, CalibrationCoefficients, CalibrationTable, ConfigurationError, ModelVariantId,
    ScoringError, ValidationError,
};

#[test]
fn applies_platt_scaling() {
    let calibrated = calibrate(0.10, &v1_coefficients()).expect("valid probability");
    // sigmoid(1.2 * 0.10 - 0.3) = sigmoid(-0.18)
    assert_close(calibrated, 0.455121);

    let centered = calibrate(0.5, &CalibrationCoefficients::new(2.0, -1.0)).expect("valid");
    assert_eq!(centered, 0.5);
}

#[test]
fn calibration_is_monotonic_for_any_valid_coefficients() {
    let coefficient_sets = [
        v1_coefficients(),
        CalibrationCoefficients::new(1.1, -0.2),
        CalibrationCoefficients::new(0.0, 0.4),
        steep_coefficients(),
        CalibrationCoefficients::new(80.0, -40.0),
    ];

    for coefficients in coefficient_sets {
        let mut previous = f64::NEG_INFINITY;
        for step in 0..=1000 {
            let p = f64::from(step) / 1000.0;
            let calibrated = calibrate(p, &coefficients).expect("in range");
            assert!((0.0..=1.0).contains(&calibrated));
            assert!(
                calibrated >= previous,
                "calibration decreased at p={p} for {coefficients:?}"
            );
            previous = calibrated;
        }
    }
}

#[test]
fn calibration_is_deterministic() {
    let first = calibrate(0.37, &steep_coefficients()).expect("valid");
    let second = calibrate(0.37, &steep_coefficients()).expect("valid");
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn rejects_out_of_range_input_instead_of_clamping() {
    for raw in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
        match calibrate(raw, &v1_coefficients()) {
            Err(ScoringError::Validation(ValidationError::ProbabilityOutOfRange {
                field, ..
            })) => assert_eq!(field, "raw_probability"),
            other => panic!("expected validation error for {raw}, got {other:?}"),
        }
    }
}

#[test]
fn boundary_inputs_are_accepted() {
    assert!(calibrate(0.0, &v1_coefficients()).is_ok());
    assert!(calibrate(1.0, &v1_coefficients()).is_ok());
}

#[test]
fn output_stays_in_unit_interval_for_extreme_slopes() {
    let coefficients = CalibrationCoefficients::new(1.0e6, -1.0e3);
    assert_eq!(calibrate(1.0, &coefficients).expect("valid"), 1.0);
    assert!(calibrate(0.0, &coefficients).expect("valid") >= 0.0);
}

#[test]
fn rejects_coefficients_that_break_rank_order() {
    let err = calibrate(0.4, &CalibrationCoefficients::new(-1.0, 0.0)).expect_err("negative slope");
    assert!(matches!(
        err,
        ScoringError::Configuration(ConfigurationError::InvalidCoefficients { .. })
    ));
    assert!(!err.is_client_error());

    let err = calibrate(0.4, &CalibrationCoefficients::new(1.0, f64::NAN)).expect_err("nan");
    assert!(matches!(err, ScoringError::Configuration(_)));
}

#[test]
fn standard_table_serves_both_production_variants() {
    let table = CalibrationTable::standard();

    let v1 = table
        .coefficients_for(&ModelVariantId::new("V1_2025_11"))
        .expect("v1 present");
    let v3 = table
        .coefficients_for(&ModelVariantId::new("V3_2025_11"))
        .expect("v3 present");

    assert_eq!(v1, CalibrationCoefficients::new(1.2, -0.3));
    assert_eq!(v3, CalibrationCoefficients::new(1.1, -0.2));
    assert_eq!(table.variants().count(), 2);
}

#[test]
fn unknown_variant_is_a_configuration_error() {
    let err = CalibrationTable::standard()
        .coefficients_for(&ModelVariantId::new("V2_2024_01"))
        .expect_err("variant missing");
    assert_eq!(
        err,
        ConfigurationError::UnknownModelVariant(ModelVariantId::new("V2_2024_01"))
    );
    assert!(err.to_string().contains("V2_2024_01"));
}
