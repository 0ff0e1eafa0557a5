use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Identifier for the model variant that produced a raw probability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelVariantId(pub String);

impl ModelVariantId {
    /// Variant trained on applicants with prior evictions.
    pub const EVICTION_HISTORY: &'static str = "V1_2025_11";
    /// Variant trained on the financial profile of applicants without evictions.
    pub const FINANCIAL: &'static str = "V3_2025_11";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Route an applicant to the variant whose training population matches them.
    pub fn for_applicant(attributes: &AuxiliaryAttributes) -> Self {
        if attributes.eviction_count > 0 {
            Self::new(Self::EVICTION_HISTORY)
        } else {
            Self::new(Self::FINANCIAL)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelVariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platt scaling coefficients for one model variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCoefficients {
    pub a: f64,
    pub b: f64,
}

impl CalibrationCoefficients {
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

/// Dollar cost of each kind of misclassification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    /// Cost of rejecting a tenant who would have paid.
    pub false_positive_cost: f64,
    /// Cost of accepting a tenant who defaults.
    pub false_negative_cost: f64,
}

impl CostParameters {
    pub const fn new(false_positive_cost: f64, false_negative_cost: f64) -> Self {
        Self {
            false_positive_cost,
            false_negative_cost,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_cost("false_positive_cost", self.false_positive_cost)?;
        validate_cost("false_negative_cost", self.false_negative_cost)
    }

    /// Ratio of false-positive to false-negative cost. Only meaningful after `validate`.
    pub fn cost_ratio(&self) -> f64 {
        self.false_positive_cost / self.false_negative_cost
    }
}

fn validate_cost(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveCost { field, value })
    }
}

/// Relative flow of incoming applications for the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationVolume {
    Low,
    #[default]
    Normal,
    High,
}

impl ApplicationVolume {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationVolume::Low => "low",
            ApplicationVolume::Normal => "normal",
            ApplicationVolume::High => "high",
        }
    }
}

impl FromStr for ApplicationVolume {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            _ => Err(ValidationError::UnknownApplicationVolume(value.to_string())),
        }
    }
}

/// Market pressure signals that loosen or tighten the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub vacancy_rate: f64,
    #[serde(default)]
    pub application_volume: ApplicationVolume,
}

impl Default for MarketContext {
    fn default() -> Self {
        Self {
            vacancy_rate: 0.05,
            application_volume: ApplicationVolume::Normal,
        }
    }
}

impl MarketContext {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if (0.0..=1.0).contains(&self.vacancy_rate) {
            Ok(())
        } else {
            Err(ValidationError::VacancyRateOutOfRange(self.vacancy_rate))
        }
    }
}

/// Applicant facts consulted only when confirming an automatic rejection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryAttributes {
    pub eviction_count: u32,
    pub credit_score: Option<u16>,
}

impl AuxiliaryAttributes {
    pub const fn new(eviction_count: u32, credit_score: Option<u16>) -> Self {
        Self {
            eviction_count,
            credit_score,
        }
    }
}

/// Coarse decision bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionTier {
    AutoApprove,
    ManualReview,
    AutoReject,
}

impl DecisionTier {
    pub const fn label(self) -> &'static str {
        match self {
            DecisionTier::AutoApprove => "AUTO_APPROVE",
            DecisionTier::ManualReview => "MANUAL_REVIEW",
            DecisionTier::AutoReject => "AUTO_REJECT",
        }
    }

    pub const fn risk_category(self) -> RiskCategory {
        match self {
            DecisionTier::AutoApprove => RiskCategory::Low,
            DecisionTier::ManualReview => RiskCategory::Medium,
            DecisionTier::AutoReject => RiskCategory::High,
        }
    }

    pub const fn recommendation(self) -> Recommendation {
        match self {
            DecisionTier::AutoApprove => Recommendation::Approve,
            DecisionTier::ManualReview => Recommendation::ManualReview,
            DecisionTier::AutoReject => Recommendation::Reject,
        }
    }
}

/// Priority label within the manual-review tier, ascending in risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubTier {
    LowMedium,
    Medium,
    MediumHigh,
}

impl SubTier {
    pub const fn label(self) -> &'static str {
        match self {
            SubTier::LowMedium => "LOW_MEDIUM",
            SubTier::Medium => "MEDIUM",
            SubTier::MediumHigh => "MEDIUM_HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Approve,
    ManualReview,
    Reject,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::Approve => "APPROVE",
            Recommendation::ManualReview => "MANUAL_REVIEW",
            Recommendation::Reject => "REJECT",
        }
    }
}

/// Outcome of classifying one calibrated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub tier: DecisionTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_tier: Option<SubTier>,
    pub reasoning: String,
    pub confidence: f64,
    /// Calibrated probability the decision was made on.
    pub probability: f64,
    /// Set when the probability crossed auto-reject but the rejection was not corroborated.
    pub downgraded: bool,
}

impl Decision {
    /// Probability expressed as a 0-100 score.
    pub fn risk_score(&self) -> u8 {
        (self.probability * 100.0).round().clamp(0.0, 100.0) as u8
    }

    pub fn risk_category(&self) -> RiskCategory {
        self.tier.risk_category()
    }

    pub fn recommendation(&self) -> Recommendation {
        self.tier.recommendation()
    }
}
