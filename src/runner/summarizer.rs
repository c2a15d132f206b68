use std::sync::Arc;

use super::retry::{call_with_retry, RetryPolicy};
use super::types::ExecutionArtifact;
use crate::capability::{ReportCapability, SummarizeTestReportInput};
use crate::error::SummarizationError;
use crate::report::types::Report;

/// Asks the report capability to summarize an execution artifact.
#[derive(Clone)]
pub struct ReportSummarizer {
    capability: Arc<dyn ReportCapability>,
    retry: RetryPolicy,
}

impl ReportSummarizer {
    pub fn new(capability: Arc<dyn ReportCapability>, retry: RetryPolicy) -> Self {
        Self { capability, retry }
    }

    pub async fn summarize(
        &self,
        artifact: &ExecutionArtifact,
    ) -> Result<Report, SummarizationError> {
        let input = &SummarizeTestReportInput {
            test_results: artifact.narrative().to_string(),
        };
        let capability = &self.capability;

        let output = call_with_retry(&self.retry, "Report summarization", move || {
            capability.summarize_test_report(input)
        })
        .await?;

        match output.summary {
            Some(summary) if !summary.is_empty() => Ok(Report {
                summary,
                actions: output.actions.unwrap_or_default(),
            }),
            _ => Err(SummarizationError::EmptySummary),
        }
    }
}
