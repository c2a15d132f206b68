//! Generative capability boundary
//!
//! The pipeline only knows these traits; `GeminiClient` is the production
//! implementation and tests substitute in-process fakes.

pub mod gemini;
pub mod prompts;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::{
    GenerateTestCasesInput, GenerateTestCasesOutput, ReportCapability, SummarizeTestReportInput,
    SummarizeTestReportOutput, TestCaseCapability,
};
