//! REST endpoints for the test agent
//!
//! `POST /api/run-test` is the `runTest` entry point. It always answers `200`
//! with an [`ActionResult`] body, success or not.

use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::report::types::ActionResult;
use crate::request::RawTestRequest;
use crate::runner::{run_test, Orchestrator};

/// Shared state for API handlers
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Build API router
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/run-test", post(run_test_handler))
        .route("/api/health", get(health))
}

/// POST /api/run-test - Run the whole pipeline for `{url, prompt}`
async fn run_test_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Json<ActionResult> {
    // An unreadable body is treated like empty fields so it fails validation
    let values = match serde_json::from_slice::<RawTestRequest>(&body) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("Rejecting unparseable run-test body: {}", e);
            RawTestRequest::default()
        }
    };

    Json(run_test(&state.orchestrator, values).await)
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
