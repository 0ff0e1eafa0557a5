use serde::{Deserialize, Serialize};

use super::calibration::ensure_probability;
use super::domain::{AuxiliaryAttributes, Decision, DecisionTier, SubTier};
use super::error::ValidationError;
use super::thresholds::ThresholdSet;

/// Corroboration rule an automatic rejection must satisfy beyond the probability itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionPolicy {
    pub min_evictions: u32,
    pub subprime_credit_cutoff: u16,
}

impl Default for RejectionPolicy {
    fn default() -> Self {
        Self {
            min_evictions: 2,
            subprime_credit_cutoff: 600,
        }
    }
}

impl RejectionPolicy {
    /// True when the applicant's history independently confirms extreme risk.
    ///
    /// A missing credit score never corroborates.
    pub fn corroborates(&self, attributes: &AuxiliaryAttributes) -> bool {
        attributes.eviction_count >= self.min_evictions
            && attributes
                .credit_score
                .map(|score| score < self.subprime_credit_cutoff)
                .unwrap_or(false)
    }
}

/// Stateless classifier placing a calibrated probability into a decision tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionEngine {
    policy: RejectionPolicy,
}

impl DecisionEngine {
    pub fn new(policy: RejectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RejectionPolicy {
        &self.policy
    }

    pub fn decide(
        &self,
        probability: f64,
        thresholds: &ThresholdSet,
        attributes: &AuxiliaryAttributes,
    ) -> Result<Decision, ValidationError> {
        ensure_probability("calibrated_probability", probability)?;
        thresholds.validate()?;

        let confidence = ((probability - 0.5).abs() * 2.0).clamp(0.0, 1.0);
        let percent = probability * 100.0;

        if probability < thresholds.auto_approve {
            return Ok(Decision {
                tier: DecisionTier::AutoApprove,
                sub_tier: None,
                reasoning: format!(
                    "Low default risk ({percent:.1}%) below auto-approve threshold {:.2}. \
                     Strong applicant profile.",
                    thresholds.auto_approve
                ),
                confidence,
                probability,
                downgraded: false,
            });
        }

        if probability < thresholds.auto_reject {
            let sub_tier = review_sub_tier(probability, thresholds);
            return Ok(Decision {
                tier: DecisionTier::ManualReview,
                sub_tier: Some(sub_tier),
                reasoning: review_reasoning(sub_tier, percent),
                confidence,
                probability,
                downgraded: false,
            });
        }

        if self.policy.corroborates(attributes) {
            return Ok(Decision {
                tier: DecisionTier::AutoReject,
                sub_tier: None,
                reasoning: format!(
                    "High default risk ({percent:.1}%) at or above auto-reject threshold {:.2}, \
                     corroborated by {} eviction(s) and credit score {} below {}. \
                     Application rejected.",
                    thresholds.auto_reject,
                    attributes.eviction_count,
                    credit_label(attributes.credit_score),
                    self.policy.subprime_credit_cutoff
                ),
                confidence,
                probability,
                downgraded: false,
            });
        }

        Ok(Decision {
            tier: DecisionTier::ManualReview,
            sub_tier: Some(SubTier::MediumHigh),
            reasoning: format!(
                "High default risk ({percent:.1}%) at or above auto-reject threshold {:.2}, \
                 but {} eviction(s) and credit score {} do not corroborate rejection; \
                 downgraded to manual review. {}",
                thresholds.auto_reject,
                attributes.eviction_count,
                credit_label(attributes.credit_score),
                review_guidance(SubTier::MediumHigh)
            ),
            confidence,
            probability,
            downgraded: true,
        })
    }
}

/// Classify with the default rejection policy.
pub fn decide(
    probability: f64,
    thresholds: &ThresholdSet,
    attributes: &AuxiliaryAttributes,
) -> Result<Decision, ValidationError> {
    DecisionEngine::default().decide(probability, thresholds, attributes)
}

/// Place a review-band probability into one of three equal-width bands spanning
/// `[auto_approve, auto_reject)`. Anything at or above `manual_review` is `MediumHigh`.
pub fn review_sub_tier(probability: f64, thresholds: &ThresholdSet) -> SubTier {
    if probability >= thresholds.manual_review {
        return SubTier::MediumHigh;
    }

    let width = (thresholds.auto_reject - thresholds.auto_approve) / 3.0;
    if probability < thresholds.auto_approve + width {
        SubTier::LowMedium
    } else if probability < thresholds.auto_approve + 2.0 * width {
        SubTier::Medium
    } else {
        SubTier::MediumHigh
    }
}

fn review_reasoning(sub_tier: SubTier, percent: f64) -> String {
    let label = match sub_tier {
        SubTier::LowMedium | SubTier::Medium => "Moderate risk",
        SubTier::MediumHigh => "Elevated risk",
    };
    format!(
        "{label} ({percent:.1}%), {} review priority. {}",
        sub_tier.label(),
        review_guidance(sub_tier)
    )
}

fn review_guidance(sub_tier: SubTier) -> &'static str {
    match sub_tier {
        SubTier::LowMedium => {
            "Lean approve: recommend income verification and co-signer consideration."
        }
        SubTier::Medium => "Recommend verifying income and rental references before deciding.",
        SubTier::MediumHigh => "Lean reject: recommend increased deposit or guarantor.",
    }
}

fn credit_label(score: Option<u16>) -> String {
    score
        .map(|value| value.to_string())
        .unwrap_or_else(|| "unavailable".to_string())
}
