use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// Input for the test-case generation capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestCasesInput {
    pub url: String,
    pub testing_prompt: String,
}

/// Output of the test-case generation capability. The field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestCasesOutput {
    #[serde(default)]
    pub test_cases: Option<String>,
}

/// Input for the report summarization capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeTestReportInput {
    pub test_results: String,
}

/// Output of the report summarization capability. Fields may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeTestReportOutput {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub actions: Option<String>,
}

/// Generative capability that turns a URL and an intent into a test plan.
#[async_trait]
pub trait TestCaseCapability: Send + Sync {
    async fn generate_test_cases(
        &self,
        input: &GenerateTestCasesInput,
    ) -> Result<GenerateTestCasesOutput, CapabilityError>;
}

/// Generative capability that turns execution results into a report.
#[async_trait]
pub trait ReportCapability: Send + Sync {
    async fn summarize_test_report(
        &self,
        input: &SummarizeTestReportInput,
    ) -> Result<SummarizeTestReportOutput, CapabilityError>;
}
