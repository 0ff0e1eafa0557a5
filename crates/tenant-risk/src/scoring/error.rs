use super::domain::ModelVariantId;

/// Malformed numeric input supplied by the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must be a positive amount, got {value}")]
    NonPositiveCost { field: &'static str, value: f64 },
    #[error("vacancy rate must be within [0, 1], got {0}")]
    VacancyRateOutOfRange(f64),
    #[error("unknown application volume '{0}' (expected low, normal, or high)")]
    UnknownApplicationVolume(String),
    #[error(
        "thresholds must satisfy 0 < auto_approve < manual_review < auto_reject < 1, \
         got {auto_approve} / {manual_review} / {auto_reject}"
    )]
    ThresholdOrdering {
        auto_approve: f64,
        manual_review: f64,
        auto_reject: f64,
    },
}

/// Calibration data missing or unusable for the requested model variant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no calibration coefficients configured for model variant {0}")]
    UnknownModelVariant(ModelVariantId),
    #[error("calibration coefficients a={a}, b={b} must be finite with a non-negative slope")]
    InvalidCoefficients { a: f64, b: f64 },
}

/// Error raised by any stage of the scoring pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ScoringError {
    /// True when the caller supplied bad input, false when the service is misconfigured.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScoringError::Validation(_))
    }
}
