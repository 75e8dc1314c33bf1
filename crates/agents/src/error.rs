use std::time::Duration;

use thiserror::Error;

/// Failures at the model boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model response contained no output text")]
    MissingOutput,
    #[error("model refused the request: {0}")]
    Refusal(String),
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    /// The reply arrived but does not fit the itinerary schema. `raw` keeps the
    /// model text so it can be shown back to the model.
    #[error("Schema validation error: {message}")]
    Schema { message: String, raw: String },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("Demo itinerary failed rules: {violations:?}")]
    DemoTemplate { violations: Vec<String> },
    #[error("Could not satisfy business rules after {max_repairs} repairs: {violations:?}")]
    Exhausted {
        max_repairs: u32,
        violations: Vec<String>,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ExtractionError {
    /// Whether the failure should be reported as a bad upstream rather than an
    /// unexpected server error.
    pub fn is_upstream(&self) -> bool {
        match self {
            Self::Config(_) | Self::DemoTemplate { .. } | Self::Exhausted { .. } => true,
            Self::Model(ModelError::Transport(_)) => false,
            Self::Model(_) => true,
        }
    }

    pub fn violations(&self) -> &[String] {
        match self {
            Self::DemoTemplate { violations } | Self::Exhausted { violations, .. } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_message_lists_violations() {
        let err = ExtractionError::Exhausted {
            max_repairs: 2,
            violations: vec!["currency must be a short code like LKR or USD.".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Could not satisfy business rules after 2 repairs: [\"currency must be a short code like LKR or USD.\"]"
        );
        assert!(err.is_upstream());
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn transport_failures_are_not_upstream() {
        let err = ExtractionError::from(ModelError::Transport("connection reset".to_string()));
        assert!(!err.is_upstream());
        assert!(ExtractionError::from(ModelError::Status {
            status: 429,
            body: "quota".to_string()
        })
        .is_upstream());
    }
}
