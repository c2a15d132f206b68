//! Gemini HTTP Client
//!
//! Implements both generative capabilities against the Gemini
//! `generateContent` REST API in JSON response mode.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

use super::prompts;
use super::traits::{
    GenerateTestCasesInput, GenerateTestCasesOutput, ReportCapability, SummarizeTestReportInput,
    SummarizeTestReportOutput, TestCaseCapability,
};
use crate::error::CapabilityError;
use crate::utils::Config;

/// Gemini client shared by the plan generator and the report summarizer
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// Base URL (e.g., "https://generativelanguage.googleapis.com")
    api_base: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiClient {
    /// Create a client from application config. Fails when no API key is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("No API key configured. Set GEMINI_API_KEY or GOOGLE_API_KEY")?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(
            &config.api_base,
            &config.model,
            &api_key,
            config.temperature,
            client,
        ))
    }

    /// Create a client with a custom reqwest client
    pub fn with_client(
        api_base: &str,
        model: &str,
        api_key: &str,
        temperature: f32,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            temperature,
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    /// Send one prompt and decode the model's text answer as `T`.
    ///
    /// A response without candidates or text decodes to `T::default()`, so
    /// absent output surfaces as absent fields rather than a transport error.
    async fn generate_json<T>(&self, prompt: String) -> Result<T, CapabilityError>
    where
        T: DeserializeOwned + Default,
    {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: self.temperature,
            },
        };

        log::debug!("POST {} (model {})", self.endpoint(), self.model);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: GenerateContentResponse = resp.json().await?;

        let text = response_text(&response);
        if text.trim().is_empty() {
            log::warn!("Model returned no text content");
            return Ok(T::default());
        }

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl TestCaseCapability for GeminiClient {
    async fn generate_test_cases(
        &self,
        input: &GenerateTestCasesInput,
    ) -> Result<GenerateTestCasesOutput, CapabilityError> {
        self.generate_json(prompts::test_cases_prompt(input)).await
    }
}

#[async_trait]
impl ReportCapability for GeminiClient {
    async fn summarize_test_report(
        &self,
        input: &SummarizeTestReportInput,
    ) -> Result<SummarizeTestReportOutput, CapabilityError> {
        self.generate_json(prompts::summary_prompt(input)).await
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Models sometimes wrap JSON in a Markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("valid fence regex")
    });

    match fence.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}
