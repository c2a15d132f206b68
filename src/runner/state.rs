use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Stage of a single pipeline run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Validating,
    Generating,
    Executing,
    Summarizing,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Successor on the happy path.
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Validating => Some(PipelineStage::Generating),
            PipelineStage::Generating => Some(PipelineStage::Executing),
            PipelineStage::Executing => Some(PipelineStage::Summarizing),
            PipelineStage::Summarizing => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Validating => "Validating input",
            PipelineStage::Generating => "Generating test plan",
            PipelineStage::Executing => "Executing test plan",
            PipelineStage::Summarizing => "Summarizing results",
            PipelineStage::Done => "Done",
            PipelineStage::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("run already finished in stage {0:?}")]
pub struct TransitionError(pub PipelineStage);

/// Outcome of one stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StageStatus {
    Passed,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub stage: PipelineStage,
    pub status: StageStatus,
    pub duration_ms: u64,
}

/// Forward-only state machine for one run.
#[derive(Debug, Clone)]
pub struct RunState {
    run_id: String,
    stage: PipelineStage,
    started_at: Instant,
    stage_started_at: Instant,
    finished_at: Option<Instant>,
    records: Vec<StageRecord>,
    plan: Option<String>,
}

impl RunState {
    pub fn new(run_id: &str) -> Self {
        let now = Instant::now();
        Self {
            run_id: run_id.to_string(),
            stage: PipelineStage::Validating,
            started_at: now,
            stage_started_at: now,
            finished_at: None,
            records: Vec::new(),
            plan: None,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Milliseconds spent in the current stage so far.
    pub fn stage_elapsed_ms(&self) -> u64 {
        self.stage_started_at.elapsed().as_millis() as u64
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
            .as_millis() as u64
    }

    /// Close the current stage as passed and move to its successor.
    pub fn advance(&mut self) -> Result<PipelineStage, TransitionError> {
        let next = self.stage.next().ok_or(TransitionError(self.stage))?;
        self.close_stage(StageStatus::Passed);
        self.enter(next);
        Ok(next)
    }

    /// Close the current stage as failed and move to `Failed`.
    pub fn fail(&mut self, error: &str) -> Result<PipelineStage, TransitionError> {
        if self.stage.is_terminal() {
            return Err(TransitionError(self.stage));
        }
        self.close_stage(StageStatus::Failed {
            error: error.to_string(),
        });
        self.enter(PipelineStage::Failed);
        Ok(PipelineStage::Failed)
    }

    pub fn set_plan(&mut self, text: &str) {
        self.plan = Some(text.to_string());
    }

    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    fn close_stage(&mut self, status: StageStatus) {
        self.records.push(StageRecord {
            stage: self.stage,
            status,
            duration_ms: self.stage_elapsed_ms(),
        });
    }

    fn enter(&mut self, stage: PipelineStage) {
        self.stage = stage;
        self.stage_started_at = Instant::now();
        if stage.is_terminal() {
            self.finished_at = Some(self.stage_started_at);
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> RunTrace {
        RunTrace {
            run_id: self.run_id.clone(),
            final_stage: self.stage,
            stages: self.records.clone(),
            plan: self.plan.clone(),
            total_duration_ms: self.elapsed_ms(),
        }
    }
}

/// Diagnostic record of a run; never part of the result envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunTrace {
    pub run_id: String,
    pub final_stage: PipelineStage,
    pub stages: Vec<StageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    pub total_duration_ms: u64,
}

impl RunTrace {
    pub fn failed_stage(&self) -> Option<&StageRecord> {
        self.stages
            .iter()
            .find(|r| matches!(r.status, StageStatus::Failed { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_visits_each_stage_once() {
        let mut state = RunState::new("run-1");
        assert_eq!(state.stage(), PipelineStage::Validating);
        assert_eq!(state.advance(), Ok(PipelineStage::Generating));
        assert_eq!(state.advance(), Ok(PipelineStage::Executing));
        assert_eq!(state.advance(), Ok(PipelineStage::Summarizing));
        assert_eq!(state.advance(), Ok(PipelineStage::Done));

        let stages: Vec<_> = state.records().iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![
                PipelineStage::Validating,
                PipelineStage::Generating,
                PipelineStage::Executing,
                PipelineStage::Summarizing,
            ]
        );
        assert!(state
            .records()
            .iter()
            .all(|r| r.status == StageStatus::Passed));
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        let mut state = RunState::new("run-2");
        for _ in 0..4 {
            state.advance().unwrap();
        }
        assert_eq!(state.advance(), Err(TransitionError(PipelineStage::Done)));
        assert_eq!(state.fail("late"), Err(TransitionError(PipelineStage::Done)));

        let mut state = RunState::new("run-3");
        state.fail("bad input").unwrap();
        assert_eq!(state.advance(), Err(TransitionError(PipelineStage::Failed)));
        assert_eq!(state.fail("again"), Err(TransitionError(PipelineStage::Failed)));
    }

    #[test]
    fn test_failure_is_recorded_on_current_stage() {
        let mut state = RunState::new("run-4");
        state.advance().unwrap();
        state.set_plan("1. Open page");
        state.fail("ECONNRESET").unwrap();

        let trace = state.to_report();
        assert_eq!(trace.final_stage, PipelineStage::Failed);
        assert_eq!(trace.plan.as_deref(), Some("1. Open page"));
        let failed = trace.failed_stage().unwrap();
        assert_eq!(failed.stage, PipelineStage::Generating);
        assert_eq!(
            failed.status,
            StageStatus::Failed {
                error: "ECONNRESET".to_string()
            }
        );
    }

    #[test]
    fn test_trace_serializes_camel_case() {
        let mut state = RunState::new("run-5");
        state.fail("nope").unwrap();
        let value = serde_json::to_value(state.to_report()).unwrap();
        assert_eq!(value["runId"], "run-5");
        assert_eq!(value["finalStage"], "failed");
        assert_eq!(value["stages"][0]["stage"], "validating");
        assert_eq!(value["stages"][0]["status"]["type"], "failed");
        assert!(value.get("plan").is_none());
    }
}
