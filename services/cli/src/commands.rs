use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tenant_risk::error::AppError;
use tenant_risk::scoring::{
    compute_thresholds, score_csv, ApplicationVolume, AuxiliaryAttributes, BatchSettings,
    CostParameters, MarketContext, ModelVariantId, RiskScorer, ScoreRequest, ScoringConfig,
    ThresholdSet,
};
use tracing::info;

/// Cost and market flags shared by every command. Unset flags use the configured defaults.
#[derive(Args, Debug, Default)]
pub(crate) struct ScenarioArgs {
    /// Cost of wrongly rejecting a tenant who would have paid
    #[arg(long)]
    pub(crate) false_positive_cost: Option<f64>,
    /// Cost of wrongly accepting a tenant who defaults
    #[arg(long)]
    pub(crate) false_negative_cost: Option<f64>,
    /// Current vacancy rate between 0 and 1
    #[arg(long)]
    pub(crate) vacancy_rate: Option<f64>,
    /// Application volume: low, normal, or high
    #[arg(long)]
    pub(crate) application_volume: Option<ApplicationVolume>,
}

impl ScenarioArgs {
    fn resolve(&self, config: &ScoringConfig) -> (CostParameters, MarketContext) {
        let costs = CostParameters::new(
            self.false_positive_cost
                .unwrap_or(config.default_costs.false_positive_cost),
            self.false_negative_cost
                .unwrap_or(config.default_costs.false_negative_cost),
        );
        let market = MarketContext {
            vacancy_rate: self
                .vacancy_rate
                .unwrap_or(config.default_market.vacancy_rate),
            application_volume: self
                .application_volume
                .unwrap_or(config.default_market.application_volume),
        };
        (costs, market)
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Uncalibrated default probability reported by the model
    #[arg(long)]
    pub(crate) raw_probability: f64,
    /// Model variant that produced the probability (routed from eviction history when omitted)
    #[arg(long)]
    pub(crate) model_variant: Option<String>,
    /// Number of prior evictions on record
    #[arg(long, default_value_t = 0)]
    pub(crate) evictions: u32,
    /// Applicant credit score, if available
    #[arg(long)]
    pub(crate) credit_score: Option<u16>,
    /// Landlord or listing key the thresholds are cached under
    #[arg(long)]
    pub(crate) context: Option<String>,
    /// Explicit auto-approve cutpoint, replacing the cost and market derived thresholds
    #[arg(long, requires_all = ["manual_review", "auto_reject"])]
    pub(crate) auto_approve: Option<f64>,
    /// Explicit manual-review cutpoint
    #[arg(long, requires_all = ["auto_approve", "auto_reject"])]
    pub(crate) manual_review: Option<f64>,
    /// Explicit auto-reject cutpoint
    #[arg(long, requires_all = ["auto_approve", "manual_review"])]
    pub(crate) auto_reject: Option<f64>,
    #[command(flatten)]
    pub(crate) scenario: ScenarioArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ThresholdArgs {
    #[command(flatten)]
    pub(crate) scenario: ScenarioArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV with applicant_id, raw_probability, model_variant, previous_evictions, credit_score
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination CSV (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Landlord or listing key the thresholds are cached under
    #[arg(long)]
    pub(crate) context: Option<String>,
    #[command(flatten)]
    pub(crate) scenario: ScenarioArgs,
}

pub(crate) fn run_score(args: ScoreArgs, config: ScoringConfig) -> Result<(), AppError> {
    let (costs, market) = args.scenario.resolve(&config);
    let mut request = ScoreRequest::new(
        args.raw_probability,
        AuxiliaryAttributes::new(args.evictions, args.credit_score),
    )
    .with_costs(costs)
    .with_market(market);
    if let Some(variant) = args.model_variant {
        request = request.with_variant(ModelVariantId::new(variant));
    }
    if let Some(context) = args.context {
        request = request.with_context(context);
    }
    if let (Some(auto_approve), Some(manual_review), Some(auto_reject)) =
        (args.auto_approve, args.manual_review, args.auto_reject)
    {
        request =
            request.with_thresholds(ThresholdSet::new(auto_approve, manual_review, auto_reject)?);
    }

    let outcome = RiskScorer::new(config).evaluate(&request)?;
    print_json(&outcome)
}

pub(crate) fn run_thresholds(args: ThresholdArgs, config: &ScoringConfig) -> Result<(), AppError> {
    let (costs, market) = args.scenario.resolve(config);
    let thresholds = compute_thresholds(&costs, Some(&market))?;
    print_json(&thresholds)
}

pub(crate) fn run_batch(args: BatchArgs, config: ScoringConfig) -> Result<(), AppError> {
    let (costs, market) = args.scenario.resolve(&config);
    let settings = BatchSettings {
        costs: Some(costs),
        market: Some(market),
        context: args.context,
    };
    let scorer = RiskScorer::new(config);
    let reader = BufReader::new(File::open(&args.input)?);

    let summary = match &args.output {
        Some(path) => score_csv(&scorer, &settings, reader, BufWriter::new(File::create(path)?))?,
        None => score_csv(&scorer, &settings, reader, io::stdout().lock())?,
    };

    info!(
        input = %args.input.display(),
        total = summary.total(),
        "batch written"
    );
    eprintln!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_fall_back_to_configuration() {
        let config = ScoringConfig::default();
        let scenario = ScenarioArgs {
            vacancy_rate: Some(0.12),
            ..ScenarioArgs::default()
        };

        let (costs, market) = scenario.resolve(&config);

        assert_eq!(costs, config.default_costs);
        assert_eq!(market.vacancy_rate, 0.12);
        assert_eq!(
            market.application_volume,
            config.default_market.application_volume
        );
    }
}
