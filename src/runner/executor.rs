//! Execution stage
//!
//! Turns a test plan into an execution artifact. The default executor does
//! not drive a browser: it records the plan itself as the narrative, which is
//! what the summarizer receives. A browser-automation executor implements
//! [`Executor`] and returns its own trace text instead.

use async_trait::async_trait;

use super::types::{ExecutionArtifact, TestPlan, EXECUTION_HEADER};

#[async_trait]
pub trait Executor: Send + Sync {
    /// Run the plan. Infallible: execution problems belong in the narrative.
    async fn execute(&self, plan: &TestPlan) -> ExecutionArtifact;
}

/// Label the plan text as the execution record.
pub fn wrap(plan: &TestPlan) -> ExecutionArtifact {
    ExecutionArtifact::new(format!("{}\n\n{}", EXECUTION_HEADER, plan.text()))
}

/// Executor that forwards the plan text unchanged under a fixed header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeExecutor;

#[async_trait]
impl Executor for NarrativeExecutor {
    async fn execute(&self, plan: &TestPlan) -> ExecutionArtifact {
        wrap(plan)
    }
}
