use std::io::{Read, Write};

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{
    AuxiliaryAttributes, CostParameters, MarketContext, ModelVariantId, Recommendation,
};
use super::orchestrator::{RiskScorer, ScoreRequest};

/// Cost and market inputs shared by every row of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSettings {
    pub costs: Option<CostParameters>,
    pub market: Option<MarketContext>,
    pub context: Option<String>,
}

/// Tally of batch results by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub approved: usize,
    pub review: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.approved + self.review + self.rejected + self.failed
    }
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    applicant_id: String,
    raw_probability: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    model_variant: Option<String>,
    #[serde(default)]
    previous_evictions: Option<u32>,
    #[serde(default)]
    credit_score: Option<u16>,
}

#[derive(Debug, Default, Serialize)]
struct ScoredRow {
    applicant_id: String,
    model_variant: String,
    raw_probability: Option<f64>,
    calibrated_probability: Option<f64>,
    risk_score: Option<u8>,
    risk_category: String,
    tier: String,
    sub_tier: String,
    recommendation: String,
    confidence: Option<f64>,
    reasoning: String,
    error: String,
}

/// Score every applicant row in `reader`, writing one result row per input row to `writer`.
///
/// Rows with unparseable fields or failed validation are reported in the `error` column and
/// the batch continues. I/O errors and structurally broken CSV (such as a short row) abort it.
pub fn score_csv<R: Read, W: Write>(
    scorer: &RiskScorer,
    settings: &BatchSettings,
    reader: R,
    writer: W,
) -> Result<BatchSummary, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let id_column = headers.iter().position(|name| name == "applicant_id");
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut summary = BatchSummary::default();

    for record in csv_reader.records() {
        let record = record?;
        let row = match record.deserialize::<ApplicantRow>(Some(&headers)) {
            Ok(row) => row,
            Err(err) if matches!(err.kind(), csv::ErrorKind::Deserialize { .. }) => {
                summary.failed += 1;
                let applicant_id = unparsed_applicant_id(&record, id_column);
                tracing::warn!(applicant_id = %applicant_id, error = %err, "batch row unreadable");
                csv_writer.serialize(ScoredRow {
                    applicant_id,
                    error: err.to_string(),
                    ..ScoredRow::default()
                })?;
                continue;
            }
            Err(err) => return Err(err),
        };
        let request = request_for(&row, settings);

        let scored = match scorer.evaluate(&request) {
            Ok(outcome) => {
                match outcome.decision.recommendation() {
                    Recommendation::Approve => summary.approved += 1,
                    Recommendation::ManualReview => summary.review += 1,
                    Recommendation::Reject => summary.rejected += 1,
                }
                ScoredRow {
                    applicant_id: row.applicant_id,
                    model_variant: outcome.model_variant.to_string(),
                    raw_probability: Some(outcome.raw_probability),
                    calibrated_probability: Some(outcome.calibrated_probability),
                    risk_score: Some(outcome.risk_score),
                    risk_category: outcome.risk_category.label().to_string(),
                    tier: outcome.decision.tier.label().to_string(),
                    sub_tier: outcome
                        .decision
                        .sub_tier
                        .map(|sub_tier| sub_tier.label().to_string())
                        .unwrap_or_default(),
                    recommendation: outcome.decision.recommendation().label().to_string(),
                    confidence: Some(outcome.decision.confidence),
                    reasoning: outcome.decision.reasoning,
                    error: String::new(),
                }
            }
            Err(err) => {
                summary.failed += 1;
                tracing::warn!(applicant_id = %row.applicant_id, error = %err, "batch row failed");
                ScoredRow {
                    applicant_id: row.applicant_id,
                    model_variant: request
                        .model_variant
                        .map(|variant| variant.to_string())
                        .unwrap_or_default(),
                    raw_probability: Some(row.raw_probability),
                    error: err.to_string(),
                    ..ScoredRow::default()
                }
            }
        };

        csv_writer.serialize(scored)?;
    }

    csv_writer.flush()?;
    tracing::info!(
        approved = summary.approved,
        review = summary.review,
        rejected = summary.rejected,
        failed = summary.failed,
        "batch scoring complete"
    );
    Ok(summary)
}

fn request_for(row: &ApplicantRow, settings: &BatchSettings) -> ScoreRequest {
    let attributes =
        AuxiliaryAttributes::new(row.previous_evictions.unwrap_or(0), row.credit_score);
    let variant = row
        .model_variant
        .as_deref()
        .map(ModelVariantId::new)
        .unwrap_or_else(|| ModelVariantId::for_applicant(&attributes));

    ScoreRequest {
        raw_probability: row.raw_probability,
        model_variant: Some(variant),
        attributes,
        costs: settings.costs,
        market: settings.market,
        context: settings
            .context
            .clone()
            .unwrap_or_else(|| ScoreRequest::DEFAULT_CONTEXT.to_string()),
        thresholds: None,
    }
}

// Falls back to the input line when the id column is missing or empty.
fn unparsed_applicant_id(record: &csv::StringRecord, id_column: Option<usize>) -> String {
    id_column
        .and_then(|index| record.get(index))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            format!("line {line}")
        })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
