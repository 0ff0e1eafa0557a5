use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{CalibrationCoefficients, ModelVariantId};
use super::error::{ConfigurationError, ScoringError, ValidationError};

/// Map a raw model probability onto the empirical default rate with Platt scaling.
///
/// The input is rejected rather than clamped when it falls outside `[0, 1]`; only the
/// output is clamped.
pub fn calibrate(
    raw_probability: f64,
    coefficients: &CalibrationCoefficients,
) -> Result<f64, ScoringError> {
    ensure_probability("raw_probability", raw_probability)?;
    ensure_coefficients(coefficients)?;

    let z = coefficients.a * raw_probability + coefficients.b;
    Ok(sigmoid(z).clamp(0.0, 1.0))
}

pub(crate) fn ensure_probability(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ProbabilityOutOfRange { field, value })
    }
}

// A negative slope would invert the rank order of applicants.
fn ensure_coefficients(coefficients: &CalibrationCoefficients) -> Result<(), ConfigurationError> {
    let CalibrationCoefficients { a, b } = *coefficients;
    if a.is_finite() && b.is_finite() && a >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidCoefficients { a, b })
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Calibration coefficients keyed by the model variant that produced the probability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    entries: BTreeMap<ModelVariantId, CalibrationCoefficients>,
}

impl CalibrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coefficients fitted for the two production variants.
    pub fn standard() -> Self {
        Self::new()
            .with_variant(
                ModelVariantId::new(ModelVariantId::EVICTION_HISTORY),
                CalibrationCoefficients::new(1.2, -0.3),
            )
            .with_variant(
                ModelVariantId::new(ModelVariantId::FINANCIAL),
                CalibrationCoefficients::new(1.1, -0.2),
            )
    }

    pub fn with_variant(
        mut self,
        variant: ModelVariantId,
        coefficients: CalibrationCoefficients,
    ) -> Self {
        self.entries.insert(variant, coefficients);
        self
    }

    pub fn coefficients_for(
        &self,
        variant: &ModelVariantId,
    ) -> Result<CalibrationCoefficients, ConfigurationError> {
        self.entries
            .get(variant)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownModelVariant(variant.clone()))
    }

    pub fn variants(&self) -> impl Iterator<Item = &ModelVariantId> {
        self.entries.keys()
    }
}
