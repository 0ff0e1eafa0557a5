use crate::scoring::{
    AuxiliaryAttributes, CalibrationCoefficients, CalibrationTable, CostParameters,
    ModelVariantId, RiskScorer, ScoringConfig, ThresholdSet,
};

pub(super) const STEEP_VARIANT: &str = "STEEP_TEST";

pub(super) fn default_thresholds() -> ThresholdSet {
    ThresholdSet::default()
}

pub(super) fn neutral_costs() -> CostParameters {
    CostParameters::new(1000.0, 1000.0)
}

pub(super) fn applicant(evictions: u32, credit_score: u16) -> AuxiliaryAttributes {
    AuxiliaryAttributes::new(evictions, Some(credit_score))
}

pub(super) fn v1_coefficients() -> CalibrationCoefficients {
    CalibrationCoefficients::new(1.2, -0.3)
}

/// Coefficients that spread raw probabilities across the whole unit interval, so every tier
/// is reachable.
pub(super) fn steep_coefficients() -> CalibrationCoefficients {
    CalibrationCoefficients::new(10.0, -5.0)
}

pub(super) fn steep_config() -> ScoringConfig {
    ScoringConfig {
        calibration: CalibrationTable::standard()
            .with_variant(ModelVariantId::new(STEEP_VARIANT), steep_coefficients()),
        ..ScoringConfig::default()
    }
}

pub(super) fn steep_scorer() -> RiskScorer {
    RiskScorer::new(steep_config())
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
