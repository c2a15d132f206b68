use serde::{Deserialize, Serialize};

/// Request as it arrives from the presentation layer, before any checks.
///
/// Missing fields deserialize to empty strings so that an incomplete body is
/// reported as a validation failure rather than a transport error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTestRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub prompt: String,
}

impl RawTestRequest {
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompt: prompt.into(),
        }
    }
}

/// A request that passed validation. Only [`InputValidator`] builds these.
///
/// [`InputValidator`]: super::validator::InputValidator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRequest {
    url: String,
    prompt: String,
}

impl TestRequest {
    pub(crate) fn new(url: String, prompt: String) -> Self {
        Self { url, prompt }
    }

    /// Absolute URL of the site under test.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Natural-language testing intent.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}
