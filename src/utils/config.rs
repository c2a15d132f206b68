use anyhow::{Context, Result};
use std::time::Duration;

use crate::runner::retry::RetryPolicy;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API key for the generative model (GEMINI_API_KEY or GOOGLE_API_KEY)
    pub api_key: Option<String>,

    /// Model name used for both plan generation and summarization
    pub model: String,

    /// Base URL of the generative API
    pub api_base: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Timeout applied to each capability call (ms)
    pub request_timeout_ms: u64,

    /// Attempts per capability call, including the first one
    pub max_attempts: u32,

    /// Initial delay between retries (ms), doubled on each attempt
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: 0.4,
            request_timeout_ms: 60_000,
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Config {
    /// Load from process environment on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));

        if let Some(model) = get("AI_TEST_AGENT_MODEL") {
            config.model = model;
        }
        if let Some(base) = get("AI_TEST_AGENT_API_BASE") {
            config.api_base = base;
        }
        if let Some(raw) = get("AI_TEST_AGENT_TIMEOUT_MS") {
            config.request_timeout_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid AI_TEST_AGENT_TIMEOUT_MS: {}", raw))?;
        }
        if let Some(raw) = get("AI_TEST_AGENT_MAX_ATTEMPTS") {
            config.max_attempts = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid AI_TEST_AGENT_MAX_ATTEMPTS: {}", raw))?;
        }
        if let Some(raw) = get("AI_TEST_AGENT_RETRY_DELAY_MS") {
            config.retry_delay_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid AI_TEST_AGENT_RETRY_DELAY_MS: {}", raw))?;
        }

        Ok(config)
    }

    /// Retry behaviour for capability calls derived from this config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.retry_delay_ms),
            timeout: Some(Duration::from_millis(self.request_timeout_ms)),
            ..RetryPolicy::default()
        }
    }
}
