pub mod api;
pub mod capability;
pub mod error;
pub mod report;
pub mod request;
pub mod runner;
pub mod utils;

// Re-export common items
pub use report::{generate_report, ActionResult, Report};
pub use request::RawTestRequest;
pub use runner::{run_test, Orchestrator};
