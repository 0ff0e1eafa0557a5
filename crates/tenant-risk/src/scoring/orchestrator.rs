use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use super::cache::ThresholdCache;
use super::calibration::{calibrate, CalibrationTable};
use super::decision::{DecisionEngine, RejectionPolicy};
use super::domain::{
    AuxiliaryAttributes, CalibrationCoefficients, CostParameters, Decision, MarketContext,
    ModelVariantId, RiskCategory,
};
use super::error::ScoringError;
use super::thresholds::{compute_thresholds, ThresholdSet};

/// Calibrate, derive thresholds, and classify one applicant with the default rejection policy.
pub fn score(
    raw_probability: f64,
    coefficients: &CalibrationCoefficients,
    costs: &CostParameters,
    market: Option<&MarketContext>,
    attributes: &AuxiliaryAttributes,
) -> Result<Decision, ScoringError> {
    let probability = calibrate(raw_probability, coefficients)?;
    let thresholds = compute_thresholds(costs, market)?;
    Ok(DecisionEngine::default().decide(probability, &thresholds, attributes)?)
}

/// Immutable settings injected into the scorer. Replace the whole value to change any part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub calibration: CalibrationTable,
    pub rejection: RejectionPolicy,
    pub default_costs: CostParameters,
    pub default_market: MarketContext,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationTable::standard(),
            rejection: RejectionPolicy::default(),
            default_costs: CostParameters::new(5000.0, 3000.0),
            default_market: MarketContext::default(),
        }
    }
}

/// One applicant to score. Unset cost or market fields fall back to the configured defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub raw_probability: f64,
    #[serde(default)]
    pub model_variant: Option<ModelVariantId>,
    #[serde(default)]
    pub attributes: AuxiliaryAttributes,
    #[serde(default)]
    pub costs: Option<CostParameters>,
    #[serde(default)]
    pub market: Option<MarketContext>,
    /// Cache key for the threshold set, typically the landlord or listing.
    #[serde(default = "default_context")]
    pub context: String,
    /// Explicit cutpoints that replace the cost and market derived set for this request.
    #[serde(default)]
    pub thresholds: Option<ThresholdSet>,
}

fn default_context() -> String {
    ScoreRequest::DEFAULT_CONTEXT.to_string()
}

impl ScoreRequest {
    pub const DEFAULT_CONTEXT: &'static str = "default";

    pub fn new(raw_probability: f64, attributes: AuxiliaryAttributes) -> Self {
        Self {
            raw_probability,
            model_variant: None,
            attributes,
            costs: None,
            market: None,
            context: default_context(),
            thresholds: None,
        }
    }

    pub fn with_variant(mut self, variant: ModelVariantId) -> Self {
        self.model_variant = Some(variant);
        self
    }

    pub fn with_costs(mut self, costs: CostParameters) -> Self {
        self.costs = Some(costs);
        self
    }

    pub fn with_market(mut self, market: MarketContext) -> Self {
        self.market = Some(market);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdSet) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
}

/// Full scoring result handed back to the service layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub model_variant: ModelVariantId,
    pub raw_probability: f64,
    pub calibrated_probability: f64,
    pub risk_score: u8,
    pub risk_category: RiskCategory,
    pub thresholds: ThresholdSet,
    pub decision: Decision,
}

/// Long-lived scorer holding the active configuration snapshot and threshold cache.
#[derive(Debug)]
pub struct RiskScorer {
    config: RwLock<Arc<ScoringConfig>>,
    thresholds: ThresholdCache,
}

impl RiskScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            thresholds: ThresholdCache::new(),
        }
    }

    /// Snapshot of the configuration used by requests started from now on.
    pub fn config(&self) -> Arc<ScoringConfig> {
        let guard = self.config.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a new configuration. In-flight requests finish on the snapshot they started with.
    pub fn replace_config(&self, config: ScoringConfig) {
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(config);
        tracing::info!("scoring configuration replaced");
    }

    pub fn threshold_cache(&self) -> &ThresholdCache {
        &self.thresholds
    }

    pub fn evaluate(&self, request: &ScoreRequest) -> Result<ScoringOutcome, ScoringError> {
        let config = self.config();

        let variant = request
            .model_variant
            .clone()
            .unwrap_or_else(|| ModelVariantId::for_applicant(&request.attributes));
        let coefficients = config.calibration.coefficients_for(&variant)?;
        let costs = request.costs.unwrap_or(config.default_costs);
        let market = request.market.unwrap_or(config.default_market);

        let calibrated_probability = calibrate(request.raw_probability, &coefficients)?;
        let thresholds = match &request.thresholds {
            Some(explicit) => {
                explicit.validate()?;
                Arc::new(explicit.clone())
            }
            None => self
                .thresholds
                .get_or_compute(&request.context, &costs, &market)?,
        };
        let decision = DecisionEngine::new(config.rejection).decide(
            calibrated_probability,
            &thresholds,
            &request.attributes,
        )?;

        tracing::info!(
            context = %request.context,
            variant = %variant,
            raw_probability = request.raw_probability,
            calibrated_probability,
            tier = decision.tier.label(),
            sub_tier = decision.sub_tier.map(|sub_tier| sub_tier.label()),
            downgraded = decision.downgraded,
            explicit_thresholds = request.thresholds.is_some(),
            "scored applicant"
        );

        Ok(ScoringOutcome {
            model_variant: variant,
            raw_probability: request.raw_probability,
            calibrated_probability,
            risk_score: decision.risk_score(),
            risk_category: decision.risk_category(),
            thresholds: ThresholdSet::clone(&thresholds),
            decision,
        })
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
