use crate::config::ConfigError;
use crate::scoring::{ScoringError, ValidationError};
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Scoring(ScoringError),
}

impl AppError {
    /// True when the failure stems from caller input rather than service setup.
    pub fn is_client_error(&self) -> bool {
        match self {
            AppError::Scoring(err) => err.is_client_error(),
            AppError::Csv(_) => true,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Json(_) => {
                false
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
            AppError::Json(err) => write!(f, "serialization error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Csv(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Scoring(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Scoring(ScoringError::Validation(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ConfigurationError, ModelVariantId};

    #[test]
    fn caller_input_failures_are_client_errors() {
        let invalid = AppError::from(ValidationError::VacancyRateOutOfRange(1.5));
        assert!(invalid.is_client_error());
        assert!(invalid.to_string().starts_with("scoring error: vacancy rate"));

        let csv_err = csv::ReaderBuilder::new()
            .from_reader("id,value\n1\n".as_bytes())
            .records()
            .find_map(Result::err)
            .expect("short row fails");
        assert!(AppError::from(csv_err).is_client_error());
    }

    #[test]
    fn setup_failures_are_not_client_errors() {
        let unknown = AppError::from(ScoringError::from(
            ConfigurationError::UnknownModelVariant(ModelVariantId::new("V0")),
        ));
        assert!(!unknown.is_client_error());

        let config = AppError::from(ConfigError::InvalidValue {
            key: "RISK_VACANCY_RATE",
            value: "lots".to_string(),
        });
        assert!(!config.is_client_error());

        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(!io.is_client_error());
    }
}
