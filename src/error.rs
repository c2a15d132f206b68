//! Error taxonomy for the test-run pipeline.
//!
//! Every stage reports a typed error; the orchestrator flattens them into the
//! single string carried by [`ActionResult`](crate::report::types::ActionResult).

use thiserror::Error;

/// Fixed, user-facing message for any input validation failure.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input. Please check the URL and prompt.";

/// Prefix applied to every non-validation failure.
pub const UNEXPECTED_ERROR_PREFIX: &str = "An unexpected error occurred: ";

/// A single rule violation found while validating a raw request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Client input was malformed. Carries every violated rule, not just the first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid input. Please check the URL and prompt.")]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True when the given field has at least one violation.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Failure talking to a generative capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// Network-level failure; the message is the underlying cause verbatim.
    #[error("{0}")]
    Transport(String),

    /// The capability answered with a non-success status.
    #[error("capability returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The capability answered but the payload could not be decoded.
    #[error("malformed capability response: {0}")]
    MalformedResponse(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),
}

impl CapabilityError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            CapabilityError::Transport(_) | CapabilityError::Timeout(_) => true,
            CapabilityError::Api { status, .. } => *status == 429 || *status >= 500,
            CapabilityError::MalformedResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for CapabilityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CapabilityError::MalformedResponse(err.to_string())
        } else {
            CapabilityError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Failed to generate test cases.")]
    EmptyPlan,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummarizationError {
    #[error("Failed to generate test report.")]
    EmptySummary,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Anything that can stop a pipeline run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    /// A stage panicked or otherwise failed outside the typed taxonomy.
    #[error("An unknown error occurred.")]
    Unknown,
}

impl PipelineError {
    /// Message shown to the caller. Validation keeps its fixed text, every
    /// other failure gets [`UNEXPECTED_ERROR_PREFIX`].
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation(e) => e.to_string(),
            other => format!("{}{}", UNEXPECTED_ERROR_PREFIX, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_fixed() {
        let err = PipelineError::from(ValidationError::new(vec![Violation::new(
            "url",
            "Please enter a valid URL.",
        )]));
        assert_eq!(err.user_message(), INVALID_INPUT_MESSAGE);
    }

    #[test]
    fn test_capability_message_is_prefixed_verbatim() {
        let err = PipelineError::from(GenerationError::from(CapabilityError::Transport(
            "ECONNRESET".to_string(),
        )));
        assert_eq!(
            err.user_message(),
            "An unexpected error occurred: ECONNRESET"
        );
    }

    #[test]
    fn test_empty_outputs_have_fixed_messages() {
        assert_eq!(
            PipelineError::from(GenerationError::EmptyPlan).user_message(),
            "An unexpected error occurred: Failed to generate test cases."
        );
        assert_eq!(
            PipelineError::from(SummarizationError::EmptySummary).user_message(),
            "An unexpected error occurred: Failed to generate test report."
        );
        assert_eq!(
            PipelineError::Unknown.user_message(),
            "An unexpected error occurred: An unknown error occurred."
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(CapabilityError::Transport("reset".into()).is_transient());
        assert!(CapabilityError::Timeout(100).is_transient());
        assert!(CapabilityError::Api {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(CapabilityError::Api {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!CapabilityError::Api {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!CapabilityError::MalformedResponse("bad".into()).is_transient());
    }
}
