//! Error types for the migration engine.

use crate::codec::php::PhpCodecError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("No target languages available for content type {content_type}")]
    MissingLanguages { content_type: String },
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Scheduling error: {0}")]
    Scheduling(String),
}

impl MigrationError {
    /// Errors raised before any write happened; the run is aborted with `ERRORED`.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::PreconditionFailed(_) | Self::MissingLanguages { .. }
        )
    }
}

impl From<sqlx::Error> for MigrationError {
    fn from(err: sqlx::Error) -> Self {
        MigrationError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        MigrationError::Serialization(format!("JSON serialization error: {err}"))
    }
}

impl From<PhpCodecError> for MigrationError {
    fn from(err: PhpCodecError) -> Self {
        MigrationError::Codec(err.to_string())
    }
}

impl From<config::ConfigError> for MigrationError {
    fn from(err: config::ConfigError) -> Self {
        MigrationError::Configuration(err.to_string())
    }
}

pub type MigrationResult<T> = std::result::Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::MissingLanguages {
            content_type: "page".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No target languages available for content type page"
        );
        assert_eq!(
            MigrationError::UnknownLanguage("xx".into()).to_string(),
            "Unknown language: xx"
        );
    }

    #[test]
    fn test_precondition_classification() {
        assert!(MigrationError::PreconditionFailed("no settings".into()).is_precondition());
        assert!(MigrationError::MissingLanguages {
            content_type: "post".into()
        }
        .is_precondition());
        assert!(!MigrationError::Database("gone".into()).is_precondition());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: MigrationError = json_err.into();
        assert!(matches!(err, MigrationError::Serialization(_)));
    }
}
