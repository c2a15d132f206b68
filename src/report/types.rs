use crate::runner::state::RunTrace;
use serde::{Deserialize, Serialize};

/// Human-readable outcome of one test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub summary: String,
    pub actions: String,
}

/// Result envelope returned to the presentation layer.
///
/// Serializes as `{"success":true,"data":{..}}` or
/// `{"success":false,"error":".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ActionResultWire", try_from = "ActionResultWire")]
pub enum ActionResult {
    Success(Report),
    Failure(String),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            ActionResult::Success(report) => Some(report),
            ActionResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Failure(error) => Some(error),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ActionResultWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Report>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ActionResult> for ActionResultWire {
    fn from(result: ActionResult) -> Self {
        match result {
            ActionResult::Success(report) => Self {
                success: true,
                data: Some(report),
                error: None,
            },
            ActionResult::Failure(error) => Self {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<ActionResultWire> for ActionResult {
    type Error = String;

    fn try_from(wire: ActionResultWire) -> Result<Self, Self::Error> {
        match (wire.success, wire.data, wire.error) {
            (true, Some(report), _) => Ok(ActionResult::Success(report)),
            (true, None, _) => Err("successful result is missing `data`".to_string()),
            (false, _, error) => Ok(ActionResult::Failure(
                error.unwrap_or_else(|| "An unknown error occurred.".to_string()),
            )),
        }
    }
}

/// Run record written by `run --report` and read back by `report`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    pub run_id: String,
    pub url: String,
    pub prompt: String,
    pub result: ActionResult,
    pub trace: RunTrace,
    pub generated_at: String,
}
