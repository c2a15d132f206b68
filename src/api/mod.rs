//! HTTP surface
//!
//! - `POST /api/run-test` runs the pipeline for `{url, prompt}`
//! - `GET /api/health` liveness probe

pub mod routes;
pub mod server;

pub use server::{ApiServer, ServerConfig};
