pub mod types;
pub mod validator;

pub use types::{RawTestRequest, TestRequest};
pub use validator::InputValidator;
