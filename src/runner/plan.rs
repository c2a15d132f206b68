use std::sync::Arc;

use super::retry::{call_with_retry, RetryPolicy};
use super::types::TestPlan;
use crate::capability::{GenerateTestCasesInput, TestCaseCapability};
use crate::error::GenerationError;

/// Asks the test-case capability for a plan and rejects empty answers.
#[derive(Clone)]
pub struct PlanGenerator {
    capability: Arc<dyn TestCaseCapability>,
    retry: RetryPolicy,
}

impl PlanGenerator {
    pub fn new(capability: Arc<dyn TestCaseCapability>, retry: RetryPolicy) -> Self {
        Self { capability, retry }
    }

    pub async fn generate(&self, url: &str, prompt: &str) -> Result<TestPlan, GenerationError> {
        let input = &GenerateTestCasesInput {
            url: url.to_string(),
            testing_prompt: prompt.to_string(),
        };
        let capability = &self.capability;

        let output = call_with_retry(&self.retry, "Test case generation", move || {
            capability.generate_test_cases(input)
        })
        .await?;

        output
            .test_cases
            .and_then(TestPlan::new)
            .ok_or(GenerationError::EmptyPlan)
    }
}
