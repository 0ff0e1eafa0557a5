use crate::commands::{run_batch, run_score, run_thresholds, BatchArgs, ScoreArgs, ThresholdArgs};
use clap::{Parser, Subcommand};
use tenant_risk::config::AppConfig;
use tenant_risk::error::AppError;
use tenant_risk::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "tenant-risk",
    about = "Turn tenant default-risk model output into approve, review, or reject decisions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a single applicant and print the outcome as JSON
    Score(ScoreArgs),
    /// Preview the decision thresholds for a cost and market scenario
    Thresholds(ThresholdArgs),
    /// Score a CSV of applicants and write one result row per applicant
    Batch(BatchArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(config.environment, &config.telemetry)?;

    match cli.command {
        Command::Score(args) => run_score(args, config.scoring),
        Command::Thresholds(args) => run_thresholds(args, &config.scoring),
        Command::Batch(args) => run_batch(args, config.scoring),
    }
}
