/// Header placed before the plan text in the execution narrative.
pub const EXECUTION_HEADER: &str = "Generated Test Plan:";

/// Natural-language test plan produced by the plan generator. Never zero-length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    text: String,
}

impl TestPlan {
    /// Returns `None` for empty text. Whitespace-only text is kept as is.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Textual record of an execution run, handed to the summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionArtifact {
    narrative: String,
}

impl ExecutionArtifact {
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
        }
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }
}
