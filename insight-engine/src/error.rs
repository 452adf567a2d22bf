//! Error types for the insight engine.
//!
//! The engine itself fails in exactly one situation: the input is not a
//! non-empty sequence of rows. Everything else (unparseable cells, columns
//! with too few values, degenerate denominators) is tolerated locally and
//! never reaches this enum. The remaining variants belong to the plumbing
//! around the engine: configuration, serialization, background execution and
//! the insight-generation collaborator.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the insight engine and its collaborators.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The dataset is absent, not a sequence of rows, or empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An engine configuration value is outside its legal range.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The text-generation collaborator returned an error.
    #[error("Insight generation failed ({model}): {message}")]
    InsightGeneration {
        /// Model or backend that produced the failure
        model: String,
        /// Detailed error message
        message: String,
    },

    /// The text-generation collaborator is not configured.
    #[error("Insight generation unavailable: {0}")]
    InsightUnavailable(String),

    /// A background analysis task panicked or was cancelled.
    #[error("Analysis task failed: {0}")]
    TaskJoin(String),
}

impl EngineError {
    /// Creates an invalid input error with the given message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an insight generation error for the given model.
    pub fn insight_generation(model: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InsightGeneration {
            model: model.into(),
            message: msg.into(),
        }
    }

    /// Creates an insight unavailable error with the given message.
    pub fn insight_unavailable(msg: impl Into<String>) -> Self {
        Self::InsightUnavailable(msg.into())
    }

    /// Returns true if this error came from the insight collaborator.
    pub fn is_insight_error(&self) -> bool {
        matches!(
            self,
            Self::InsightGeneration { .. } | Self::InsightUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::invalid_input("dataset is empty");
        assert_eq!(err.to_string(), "Invalid input: dataset is empty");

        let err = EngineError::insight_generation("gemini-pro", "quota exceeded");
        assert_eq!(
            err.to_string(),
            "Insight generation failed (gemini-pro): quota exceeded"
        );
    }

    #[test]
    fn test_insight_error_classification() {
        assert!(EngineError::insight_unavailable("no key").is_insight_error());
        assert!(EngineError::insight_generation("m", "x").is_insight_error());
        assert!(!EngineError::invalid_input("x").is_insight_error());
        assert!(!EngineError::configuration("x").is_insight_error());
    }

    #[test]
    fn test_from_serde_json() {
        let err: EngineError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, EngineError::Serialization(_)));
    }
}
