use url::Url;

use super::types::{RawTestRequest, TestRequest};
use crate::error::{ValidationError, Violation};

/// Minimum prompt length, counted in characters after trimming.
pub const MIN_PROMPT_CHARS: usize = 10;

/// Checks raw input and turns it into a [`TestRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator;

impl InputValidator {
    /// Validate every rule and report all violations together.
    pub fn validate(&self, raw: &RawTestRequest) -> Result<TestRequest, ValidationError> {
        let url = raw.url.trim();
        let prompt = raw.prompt.trim();

        let mut violations = Vec::new();

        if !is_absolute_url(url) {
            violations.push(Violation::new("url", "Please enter a valid URL."));
        }

        if prompt.chars().count() < MIN_PROMPT_CHARS {
            violations.push(Violation::new(
                "prompt",
                format!(
                    "Prompt must be at least {} characters long.",
                    MIN_PROMPT_CHARS
                ),
            ));
        }

        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }

        Ok(TestRequest::new(url.to_string(), prompt.to_string()))
    }
}

/// `Url::parse` only succeeds for absolute URLs with a well-formed scheme,
/// relative input fails with `RelativeUrlWithoutBase`.
fn is_absolute_url(input: &str) -> bool {
    !input.is_empty() && Url::parse(input).is_ok()
}
