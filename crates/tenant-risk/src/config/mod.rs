use std::env;
use std::fmt;
use std::str::FromStr;

use crate::scoring::{
    ApplicationVolume, CalibrationCoefficients, CalibrationTable, CostParameters, MarketContext,
    ModelVariantId, RejectionPolicy, ScoringConfig,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ScoringConfig::default();
        let default_costs = CostParameters::new(
            parse_var(
                "RISK_FALSE_POSITIVE_COST",
                defaults.default_costs.false_positive_cost,
            )?,
            parse_var(
                "RISK_FALSE_NEGATIVE_COST",
                defaults.default_costs.false_negative_cost,
            )?,
        );
        let default_market = MarketContext {
            vacancy_rate: parse_var("RISK_VACANCY_RATE", defaults.default_market.vacancy_rate)?,
            application_volume: parse_var::<ApplicationVolume>(
                "RISK_APPLICATION_VOLUME",
                defaults.default_market.application_volume,
            )?,
        };
        let rejection = RejectionPolicy {
            min_evictions: parse_var("RISK_MIN_EVICTIONS", defaults.rejection.min_evictions)?,
            subprime_credit_cutoff: parse_var(
                "RISK_SUBPRIME_CUTOFF",
                defaults.rejection.subprime_credit_cutoff,
            )?,
        };
        let calibration = CalibrationTable::new()
            .with_variant(
                ModelVariantId::new(ModelVariantId::EVICTION_HISTORY),
                coefficients_var("RISK_CALIBRATION_V1", CalibrationCoefficients::new(1.2, -0.3))?,
            )
            .with_variant(
                ModelVariantId::new(ModelVariantId::FINANCIAL),
                coefficients_var("RISK_CALIBRATION_V3", CalibrationCoefficients::new(1.1, -0.2))?,
            );

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                calibration,
                rejection,
                default_costs,
                default_market,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        _ => Ok(default),
    }
}

// Expects "a,b", e.g. "1.2,-0.3".
fn coefficients_var(
    key: &'static str,
    default: CalibrationCoefficients,
) -> Result<CalibrationCoefficients, ConfigError> {
    let raw = match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(default),
    };

    let invalid = || ConfigError::InvalidCoefficients {
        key,
        value: raw.clone(),
    };
    let (a, b) = raw.split_once(',').ok_or_else(invalid)?;
    let a = a.trim().parse::<f64>().map_err(|_| invalid())?;
    let b = b.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok(CalibrationCoefficients::new(a, b))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    InvalidCoefficients { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "{key} has an unparseable value '{value}'")
            }
            ConfigError::InvalidCoefficients { key, value } => {
                write!(f, "{key} must be two comma-separated numbers 'a,b', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
