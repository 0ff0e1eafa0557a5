use serde::{Deserialize, Serialize};

use super::domain::{ApplicationVolume, CostParameters, MarketContext};
use super::error::ValidationError;

pub const BASE_AUTO_APPROVE: f64 = 0.35;
pub const BASE_MANUAL_REVIEW: f64 = 0.70;
pub const BASE_AUTO_REJECT: f64 = 0.85;

const LENIENT_COST_RATIO: f64 = 1.5;
const STRICT_COST_RATIO: f64 = 0.7;
const COST_SENSITIVITY: f64 = 0.06;
const MAX_COST_SHIFT: f64 = 0.10;

const HIGH_VACANCY_RATE: f64 = 0.10;
const LOW_VACANCY_RATE: f64 = 0.03;
const VACANCY_SHIFT: f64 = 0.03;

const VOLUME_SHIFT: f64 = 0.02;

const AUTO_APPROVE_BAND: (f64, f64) = (0.20, 0.50);
const MANUAL_REVIEW_BAND: (f64, f64) = (0.55, 0.80);
const AUTO_REJECT_BAND: (f64, f64) = (0.75, 0.95);
const MIN_THRESHOLD_GAP: f64 = 0.01;

/// Cutpoints separating the approve, review, and reject tiers.
///
/// Instances are only ever replaced, never edited, so a cached set can be shared freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub auto_approve: f64,
    pub manual_review: f64,
    pub auto_reject: f64,
    #[serde(default)]
    pub adjustments: Vec<ThresholdAdjustment>,
    #[serde(default = "explicit_reasoning")]
    pub reasoning: String,
}

fn explicit_reasoning() -> String {
    "explicit thresholds".to_string()
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            auto_approve: BASE_AUTO_APPROVE,
            manual_review: BASE_MANUAL_REVIEW,
            auto_reject: BASE_AUTO_REJECT,
            adjustments: Vec::new(),
            reasoning: "base thresholds without cost or market adjustment".to_string(),
        }
    }
}

impl ThresholdSet {
    /// Build a set from explicit cutpoints, rejecting any that break the ordering.
    pub fn new(
        auto_approve: f64,
        manual_review: f64,
        auto_reject: f64,
    ) -> Result<Self, ValidationError> {
        let set = Self {
            auto_approve,
            manual_review,
            auto_reject,
            adjustments: Vec::new(),
            reasoning: explicit_reasoning(),
        };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let ordered = 0.0 < self.auto_approve
            && self.auto_approve < self.manual_review
            && self.manual_review < self.auto_reject
            && self.auto_reject < 1.0;

        if ordered {
            Ok(())
        } else {
            Err(ValidationError::ThresholdOrdering {
                auto_approve: self.auto_approve,
                manual_review: self.manual_review,
                auto_reject: self.auto_reject,
            })
        }
    }
}

/// Factor that moved the thresholds away from the base prior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentFactor {
    CostRatio,
    VacancyRate,
    ApplicationVolume,
}

/// One step of the adjustment pipeline, kept on the set for audit trails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAdjustment {
    pub factor: AdjustmentFactor,
    pub shift: f64,
    pub notes: String,
}

/// Compute the threshold set for the given costs and market, defaulting the market when absent.
pub fn compute_thresholds(
    costs: &CostParameters,
    market: Option<&MarketContext>,
) -> Result<ThresholdSet, ValidationError> {
    costs.validate()?;
    let market = market.copied().unwrap_or_default();
    market.validate()?;

    let cost_ratio = costs.cost_ratio();
    let adjustments = vec![
        cost_adjustment(cost_ratio),
        vacancy_adjustment(market.vacancy_rate),
        volume_adjustment(market.application_volume),
    ];

    // Summed in pipeline order so identical inputs give bit-identical cutpoints.
    let total_shift = adjustments
        .iter()
        .fold(0.0, |acc, adjustment| acc + adjustment.shift);

    let (auto_approve, manual_review, auto_reject) = clamp_to_bands(
        BASE_AUTO_APPROVE + total_shift,
        BASE_MANUAL_REVIEW + total_shift,
        BASE_AUTO_REJECT + total_shift,
    );

    let reasoning = summarize(cost_ratio, &market, total_shift);
    tracing::debug!(
        cost_ratio,
        vacancy_rate = market.vacancy_rate,
        volume = market.application_volume.label(),
        auto_approve,
        manual_review,
        auto_reject,
        "computed decision thresholds"
    );

    let set = ThresholdSet {
        auto_approve,
        manual_review,
        auto_reject,
        adjustments: adjustments
            .into_iter()
            .filter(|adjustment| adjustment.shift != 0.0)
            .collect(),
        reasoning,
    };
    set.validate()?;
    Ok(set)
}

/// Shift driven by the false-positive to false-negative cost ratio.
pub fn cost_adjustment(cost_ratio: f64) -> ThresholdAdjustment {
    let magnitude = (cost_ratio.ln().abs() * COST_SENSITIVITY).min(MAX_COST_SHIFT);
    let (shift, notes) = if cost_ratio > LENIENT_COST_RATIO {
        (
            magnitude,
            format!("cost ratio {cost_ratio:.2} favors approval; thresholds raised"),
        )
    } else if cost_ratio < STRICT_COST_RATIO {
        (
            -magnitude,
            format!("cost ratio {cost_ratio:.2} favors caution; thresholds lowered"),
        )
    } else {
        (0.0, format!("cost ratio {cost_ratio:.2} within neutral range"))
    };

    ThresholdAdjustment {
        factor: AdjustmentFactor::CostRatio,
        shift,
        notes,
    }
}

/// Shift driven by how urgently the landlord needs to fill the unit.
pub fn vacancy_adjustment(vacancy_rate: f64) -> ThresholdAdjustment {
    let (shift, notes) = if vacancy_rate > HIGH_VACANCY_RATE {
        (
            VACANCY_SHIFT,
            format!("high vacancy {:.1}%; thresholds raised", vacancy_rate * 100.0),
        )
    } else if vacancy_rate < LOW_VACANCY_RATE {
        (
            -VACANCY_SHIFT,
            format!("tight vacancy {:.1}%; thresholds lowered", vacancy_rate * 100.0),
        )
    } else {
        (
            0.0,
            format!("vacancy {:.1}% within normal band", vacancy_rate * 100.0),
        )
    };

    ThresholdAdjustment {
        factor: AdjustmentFactor::VacancyRate,
        shift,
        notes,
    }
}

pub fn volume_adjustment(volume: ApplicationVolume) -> ThresholdAdjustment {
    let (shift, notes) = match volume {
        ApplicationVolume::Low => (
            VOLUME_SHIFT,
            "low application volume; thresholds raised".to_string(),
        ),
        ApplicationVolume::Normal => (0.0, "normal application volume".to_string()),
        ApplicationVolume::High => (
            -VOLUME_SHIFT,
            "high application volume; thresholds lowered".to_string(),
        ),
    };

    ThresholdAdjustment {
        factor: AdjustmentFactor::ApplicationVolume,
        shift,
        notes,
    }
}

/// Clamp each cutpoint to its operating band, then restore strict ordering.
pub fn clamp_to_bands(auto_approve: f64, manual_review: f64, auto_reject: f64) -> (f64, f64, f64) {
    let auto_approve = auto_approve.clamp(AUTO_APPROVE_BAND.0, AUTO_APPROVE_BAND.1);
    let manual_review = manual_review.clamp(MANUAL_REVIEW_BAND.0, MANUAL_REVIEW_BAND.1);
    let auto_reject = auto_reject.clamp(AUTO_REJECT_BAND.0, AUTO_REJECT_BAND.1);

    let (auto_approve, manual_review) = separate(auto_approve, manual_review);
    let (manual_review, auto_reject) = separate(manual_review, auto_reject);
    (auto_approve, manual_review, auto_reject)
}

// Pulls a crossed or touching pair apart around its midpoint instead of dropping the shift.
fn separate(lower: f64, upper: f64) -> (f64, f64) {
    if upper - lower >= MIN_THRESHOLD_GAP {
        return (lower, upper);
    }
    let midpoint = (lower + upper) / 2.0;
    let half_gap = MIN_THRESHOLD_GAP / 2.0;
    (midpoint - half_gap, midpoint + half_gap)
}

fn summarize(cost_ratio: f64, market: &MarketContext, total_shift: f64) -> String {
    let cost_band = if cost_ratio > LENIENT_COST_RATIO {
        "lenient"
    } else if cost_ratio < STRICT_COST_RATIO {
        "strict"
    } else {
        "neutral"
    };
    let vacancy_band = if market.vacancy_rate > HIGH_VACANCY_RATE {
        "high"
    } else if market.vacancy_rate < LOW_VACANCY_RATE {
        "tight"
    } else {
        "normal"
    };

    format!(
        "cost ratio {cost_ratio:.2} ({cost_band}), vacancy {:.1}% ({vacancy_band}), \
         {} application volume; net shift {total_shift:+.3}",
        market.vacancy_rate * 100.0,
        market.application_volume.label(),
    )
}
