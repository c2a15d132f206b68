pub mod events;
pub mod executor;
pub mod plan;
pub mod retry;
pub mod state;
pub mod summarizer;
pub mod types;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::capability::{ReportCapability, TestCaseCapability};
use crate::error::PipelineError;
use crate::report::types::{ActionResult, Report};
use crate::request::{InputValidator, RawTestRequest};

pub use events::*;
pub use executor::{Executor, NarrativeExecutor};
pub use plan::PlanGenerator;
pub use retry::RetryPolicy;
pub use state::*;
pub use summarizer::ReportSummarizer;
pub use types::{ExecutionArtifact, TestPlan};

/// Envelope plus the diagnostic trace of the same run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: ActionResult,
    pub trace: RunTrace,
}

/// Sequences validation, plan generation, execution and summarization.
///
/// Holds no per-run state, so one instance can serve concurrent runs.
pub struct Orchestrator {
    validator: InputValidator,
    test_cases: Arc<dyn TestCaseCapability>,
    reports: Arc<dyn ReportCapability>,
    planner: PlanGenerator,
    executor: Arc<dyn Executor>,
    summarizer: ReportSummarizer,
    emitter: EventEmitter,
}

impl Orchestrator {
    pub fn new(
        test_cases: Arc<dyn TestCaseCapability>,
        reports: Arc<dyn ReportCapability>,
    ) -> Self {
        let retry = RetryPolicy::default();
        Self {
            validator: InputValidator,
            planner: PlanGenerator::new(test_cases.clone(), retry.clone()),
            summarizer: ReportSummarizer::new(reports.clone(), retry),
            test_cases,
            reports,
            executor: Arc::new(NarrativeExecutor),
            emitter: EventEmitter::default(),
        }
    }

    /// Replace the retry policy used for both capability calls.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.planner = PlanGenerator::new(self.test_cases.clone(), retry.clone());
        self.summarizer = ReportSummarizer::new(self.reports.clone(), retry);
        self
    }

    /// Plug in a different execution stage.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.emitter.subscribe()
    }

    /// Run the pipeline. Always resolves to an envelope.
    pub async fn run(&self, raw: &RawTestRequest) -> ActionResult {
        self.run_traced(raw).await.result
    }

    /// Like [`run`](Self::run), also returning the stage trace.
    pub async fn run_traced(&self, raw: &RawTestRequest) -> RunOutcome {
        let run_id = Uuid::new_v4().to_string();
        let mut state = RunState::new(&run_id);

        self.emitter.emit(PipelineEvent::RunStarted {
            run_id: run_id.clone(),
            url: raw.url.clone(),
        });
        self.emitter.emit(PipelineEvent::StageStarted {
            run_id: run_id.clone(),
            stage: state.stage(),
        });

        let caught = AssertUnwindSafe(self.run_stages(raw, &mut state))
            .catch_unwind()
            .await;
        let outcome = caught.unwrap_or_else(|_| {
            log::error!("Run {} panicked in stage {:?}", run_id, state.stage());
            Err(PipelineError::Unknown)
        });

        let result = match outcome {
            Ok(report) => {
                self.emitter.emit(PipelineEvent::RunFinished {
                    run_id: run_id.clone(),
                    duration_ms: state.elapsed_ms(),
                });
                log::info!("Run {} finished in {}ms", run_id, state.elapsed_ms());
                ActionResult::Success(report)
            }
            Err(err) => {
                let stage = state.stage();
                let message = err.user_message();
                match &err {
                    PipelineError::Validation(e) => {
                        log::info!("Run {} rejected: {:?}", run_id, e.violations());
                    }
                    other => log::error!("Run {} failed in {:?}: {}", run_id, stage, other),
                }
                // The stage is non-terminal here unless the state machine itself errored
                if let Err(e) = state.fail(&err.to_string()) {
                    log::debug!("Run {} trace not updated: {}", run_id, e);
                }
                self.emitter.emit(PipelineEvent::RunFailed {
                    run_id: run_id.clone(),
                    stage,
                    error: message.clone(),
                });
                ActionResult::Failure(message)
            }
        };

        RunOutcome {
            result,
            trace: state.to_report(),
        }
    }

    async fn run_stages(
        &self,
        raw: &RawTestRequest,
        state: &mut RunState,
    ) -> Result<Report, PipelineError> {
        let request = self.validator.validate(raw)?;
        self.advance(state)?;

        let plan = self
            .planner
            .generate(request.url(), request.prompt())
            .await?;
        state.set_plan(plan.text());
        self.advance(state)?;

        let artifact = self.executor.execute(&plan).await;
        self.advance(state)?;

        let report = self.summarizer.summarize(&artifact).await?;
        self.advance(state)?;

        Ok(report)
    }

    /// Close the current stage and announce the next one.
    fn advance(&self, state: &mut RunState) -> Result<(), PipelineError> {
        let finished = state.stage();
        let duration_ms = state.stage_elapsed_ms();
        let next = state.advance().map_err(|e| {
            log::error!("{}", e);
            PipelineError::Unknown
        })?;

        self.emitter.emit(PipelineEvent::StageFinished {
            run_id: state.run_id().to_string(),
            stage: finished,
            duration_ms,
        });
        if !next.is_terminal() {
            self.emitter.emit(PipelineEvent::StageStarted {
                run_id: state.run_id().to_string(),
                stage: next,
            });
        }
        Ok(())
    }
}

/// Entry point for the presentation layer: one submission, one envelope.
pub async fn run_test(orchestrator: &Orchestrator, values: RawTestRequest) -> ActionResult {
    orchestrator.run(&values).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{
        GenerateTestCasesInput, GenerateTestCasesOutput, SummarizeTestReportInput,
        SummarizeTestReportOutput,
    };
    use crate::error::CapabilityError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Plan generator fake: fixed answer, counts calls.
    struct FakePlanner {
        output: Result<GenerateTestCasesOutput, CapabilityError>,
        calls: AtomicUsize,
    }

    impl FakePlanner {
        fn returning(test_cases: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                output: Ok(GenerateTestCasesOutput {
                    test_cases: test_cases.map(str::to_string),
                }),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(error: CapabilityError) -> Arc<Self> {
            Arc::new(Self {
                output: Err(error),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TestCaseCapability for FakePlanner {
        async fn generate_test_cases(
            &self,
            _input: &GenerateTestCasesInput,
        ) -> Result<GenerateTestCasesOutput, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output.clone()
        }
    }

    /// Summarizer fake: fixed answer, records what it was given.
    struct FakeSummarizer {
        output: Result<SummarizeTestReportOutput, CapabilityError>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeSummarizer {
        fn returning(summary: Option<&str>, actions: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                output: Ok(SummarizeTestReportOutput {
                    summary: summary.map(str::to_string),
                    actions: actions.map(str::to_string),
                }),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReportCapability for FakeSummarizer {
        async fn summarize_test_report(
            &self,
            input: &SummarizeTestReportInput,
        ) -> Result<SummarizeTestReportOutput, CapabilityError> {
            self.seen.lock().unwrap().push(input.test_results.clone());
            self.output.clone()
        }
    }

    struct PanickingPlanner;

    #[async_trait]
    impl TestCaseCapability for PanickingPlanner {
        async fn generate_test_cases(
            &self,
            _input: &GenerateTestCasesInput,
        ) -> Result<GenerateTestCasesOutput, CapabilityError> {
            panic!("capability blew up");
        }
    }

    fn orchestrator(
        planner: Arc<dyn TestCaseCapability>,
        summarizer: Arc<dyn ReportCapability>,
    ) -> Orchestrator {
        Orchestrator::new(planner, summarizer).with_retry_policy(RetryPolicy::none())
    }

    fn login_request() -> RawTestRequest {
        RawTestRequest::new(
            "https://example.com",
            "Test the login form with valid and invalid credentials",
        )
    }

    fn login_planner() -> Arc<FakePlanner> {
        FakePlanner::returning(Some(
            "1. Open login page\n2. Enter valid creds\n3. Enter invalid creds",
        ))
    }

    fn login_summarizer() -> Arc<FakeSummarizer> {
        FakeSummarizer::returning(
            Some("Login flow tested successfully."),
            Some("Visited page; submitted two credential sets."),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let summarizer = login_summarizer();
        let orchestrator = orchestrator(login_planner(), summarizer.clone());

        let result = run_test(&orchestrator, login_request()).await;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "success": true,
                "data": {
                    "summary": "Login flow tested successfully.",
                    "actions": "Visited page; submitted two credential sets."
                }
            })
        );
        assert_eq!(
            summarizer.seen.lock().unwrap()[0],
            "Generated Test Plan:\n\n1. Open login page\n2. Enter valid creds\n3. Enter invalid creds"
        );
    }

    #[tokio::test]
    async fn test_invalid_url_skips_capabilities() {
        let planner = login_planner();
        let summarizer = login_summarizer();
        let orchestrator = orchestrator(planner.clone(), summarizer.clone());

        for url in ["/relative/path", "not a url", "", "ht!tp://bad"] {
            let result = orchestrator
                .run(&RawTestRequest::new(url, "a long enough testing prompt"))
                .await;
            assert_eq!(
                result,
                ActionResult::Failure("Invalid input. Please check the URL and prompt.".into())
            );
        }
        assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_short_prompt_skips_capabilities() {
        let planner = login_planner();
        let summarizer = login_summarizer();
        let orchestrator = orchestrator(planner.clone(), summarizer.clone());

        for prompt in ["", "too short", "   padded   "] {
            let result = orchestrator
                .run(&RawTestRequest::new("https://example.com", prompt))
                .await;
            assert_eq!(
                result.error(),
                Some("Invalid input. Please check the URL and prompt.")
            );
        }
        assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_same_input_same_result() {
        let orchestrator = orchestrator(login_planner(), login_summarizer());
        let first = orchestrator.run(&login_request()).await;
        let second = orchestrator.run(&login_request()).await;
        assert_eq!(first, second);
        assert!(first.is_success());
    }

    #[tokio::test]
    async fn test_empty_plan_stops_before_summarizer() {
        for plan in [None, Some("")] {
            let summarizer = login_summarizer();
            let orchestrator = orchestrator(FakePlanner::returning(plan), summarizer.clone());

            let result = orchestrator.run(&login_request()).await;
            assert!(!result.is_success());
            assert!(result
                .error()
                .unwrap()
                .contains("Failed to generate test cases."));
            assert_eq!(summarizer.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_whitespace_plan_reaches_summarizer() {
        let summarizer = login_summarizer();
        let orchestrator = orchestrator(FakePlanner::returning(Some("   ")), summarizer.clone());

        let result = orchestrator.run(&login_request()).await;
        assert!(result.is_success());
        assert_eq!(
            summarizer.seen.lock().unwrap()[0],
            "Generated Test Plan:\n\n   "
        );
    }

    struct ReplayExecutor;

    #[async_trait]
    impl Executor for ReplayExecutor {
        async fn execute(&self, plan: &TestPlan) -> ExecutionArtifact {
            ExecutionArtifact::new(format!("Executed 3 steps, 1 failed.\n{}", plan.text()))
        }
    }

    #[tokio::test]
    async fn test_custom_executor_output_is_summarized() {
        let summarizer = login_summarizer();
        let orchestrator = orchestrator(login_planner(), summarizer.clone())
            .with_executor(Arc::new(ReplayExecutor));

        let result = orchestrator.run(&login_request()).await;
        assert!(result.is_success());

        let seen = summarizer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("Executed 3 steps, 1 failed.\n1. Open login page"));
        assert!(!seen[0].contains("Generated Test Plan:"));
    }

    #[tokio::test]
    async fn test_empty_summary_fails() {
        let orchestrator = orchestrator(
            login_planner(),
            FakeSummarizer::returning(None, Some("Visited page.")),
        );
        let result = orchestrator.run(&login_request()).await;
        assert_eq!(
            result,
            ActionResult::Failure(
                "An unexpected error occurred: Failed to generate test report.".into()
            )
        );
    }

    #[tokio::test]
    async fn test_network_error_is_prefixed() {
        let summarizer = login_summarizer();
        let orchestrator = orchestrator(
            FakePlanner::failing(CapabilityError::Transport("ECONNRESET".into())),
            summarizer.clone(),
        );
        let result = orchestrator.run(&login_request()).await;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "success": false,
                "error": "An unexpected error occurred: ECONNRESET"
            })
        );
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_retries_exhausted_keep_original_message() {
        let planner = FakePlanner::failing(CapabilityError::Transport("ECONNRESET".into()));
        let orchestrator = Orchestrator::new(planner.clone(), login_summarizer())
            .with_retry_policy(RetryPolicy {
                max_attempts: 3,
                ..RetryPolicy::none()
            });

        let result = orchestrator.run(&login_request()).await;
        assert_eq!(
            result.error(),
            Some("An unexpected error occurred: ECONNRESET")
        );
        assert_eq!(planner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_panic_becomes_unknown_error() {
        let orchestrator = orchestrator(Arc::new(PanickingPlanner), login_summarizer());
        let outcome = orchestrator.run_traced(&login_request()).await;
        assert_eq!(
            outcome.result.error(),
            Some("An unexpected error occurred: An unknown error occurred.")
        );
        assert_eq!(outcome.trace.final_stage, PipelineStage::Failed);
        assert_eq!(
            outcome.trace.failed_stage().map(|r| r.stage),
            Some(PipelineStage::Generating)
        );
    }

    #[tokio::test]
    async fn test_trace_records_all_stages() {
        let orchestrator = orchestrator(login_planner(), login_summarizer());
        let outcome = orchestrator.run_traced(&login_request()).await;

        assert!(outcome.result.is_success());
        assert_eq!(outcome.trace.final_stage, PipelineStage::Done);
        let stages: Vec<_> = outcome.trace.stages.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![
                PipelineStage::Validating,
                PipelineStage::Generating,
                PipelineStage::Executing,
                PipelineStage::Summarizing,
            ]
        );
        assert!(outcome.trace.plan.unwrap().starts_with("1. Open login page"));
    }

    #[tokio::test]
    async fn test_validation_failure_trace() {
        let orchestrator = orchestrator(login_planner(), login_summarizer());
        let outcome = orchestrator
            .run_traced(&RawTestRequest::new("nope", "short"))
            .await;
        assert_eq!(outcome.trace.stages.len(), 1);
        assert_eq!(outcome.trace.stages[0].stage, PipelineStage::Validating);
        assert!(outcome.trace.plan.is_none());
    }

    #[tokio::test]
    async fn test_events_follow_stage_order() {
        let orchestrator = orchestrator(login_planner(), login_summarizer());
        let mut events = orchestrator.subscribe();
        orchestrator.run(&login_request()).await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }

        let started: Vec<_> = seen
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::StageStarted { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(
            started,
            vec![
                PipelineStage::Validating,
                PipelineStage::Generating,
                PipelineStage::Executing,
                PipelineStage::Summarizing,
            ]
        );
        assert!(matches!(seen.first(), Some(PipelineEvent::RunStarted { .. })));
        assert!(matches!(seen.last(), Some(PipelineEvent::RunFinished { .. })));
        let run_id = seen[0].run_id().to_string();
        assert!(seen.iter().all(|e| e.run_id() == run_id));
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let orchestrator = Arc::new(orchestrator(login_planner(), login_summarizer()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let orchestrator = orchestrator.clone();
            handles.push(tokio::spawn(async move {
                let raw = if i % 2 == 0 {
                    login_request()
                } else {
                    RawTestRequest::new("bad", "short")
                };
                (i, orchestrator.run(&raw).await)
            }));
        }

        for handle in handles {
            let (i, result) = handle.await.unwrap();
            assert_eq!(result.is_success(), i % 2 == 0);
        }
    }
}
