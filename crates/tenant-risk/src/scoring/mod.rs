//! Default-risk decision core: calibration, cost-aware thresholds, and tier classification.
//!
//! Every stage is a pure function of its inputs. `RiskScorer` adds the long-lived pieces a
//! service needs around them: a swappable configuration snapshot and a per-context threshold
//! cache.

pub mod batch;
mod cache;
mod calibration;
mod decision;
pub mod domain;
mod error;
mod orchestrator;
pub mod thresholds;

#[cfg(test)]
mod tests;

pub use batch::{score_csv, BatchSettings, BatchSummary};
pub use cache::ThresholdCache;
pub use calibration::{calibrate, CalibrationTable};
pub use decision::{decide, review_sub_tier, DecisionEngine, RejectionPolicy};
pub use domain::{
    ApplicationVolume, AuxiliaryAttributes, CalibrationCoefficients, CostParameters, Decision,
    DecisionTier, MarketContext, ModelVariantId, Recommendation, RiskCategory, SubTier,
};
pub use error::{ConfigurationError, ScoringError, ValidationError};
pub use orchestrator::{score, RiskScorer, ScoreRequest, ScoringConfig, ScoringOutcome};
pub use thresholds::{compute_thresholds, AdjustmentFactor, ThresholdAdjustment, ThresholdSet};
