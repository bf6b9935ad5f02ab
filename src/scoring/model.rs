//! LLM-backed scorer
//!
//! Calls the Anthropic messages API with the rendered sub-metric prompt and
//! parses the strict JSON contract {"score_1_to_5": float, "reason": str}.
//! Malformed or out-of-range model output is surfaced as an error, never
//! defaulted or clamped.

use crate::config::ScorerSettings;
use crate::error::{Result, ThemisError};
use crate::prompts;
use crate::scoring::{round2, Scorer};
use crate::types::{Exemplar, SubMetricScore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are an expert project evaluator. You must respond with ONLY \
    valid JSON in this exact format: {\"score_1_to_5\": number, \"reason\": \"text\"}. Do not \
    include any markdown formatting, code blocks, or additional text.";

/// Configuration for the model scorer
#[derive(Debug, Clone)]
pub struct ModelScorerConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Max tokens for responses
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl ModelScorerConfig {
    /// Build from scorer settings, resolving the API key from settings or env
    pub fn from_settings(settings: &ScorerSettings) -> Result<Self> {
        let api_key = settings.resolve_api_key().ok_or_else(|| {
            ThemisError::Config(config::ConfigError::Message(
                "Model scorer requires scorer.api_key or ANTHROPIC_API_KEY".to_string(),
            ))
        })?;

        Ok(Self {
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }
}

/// LLM-backed scorer
pub struct ModelScorer {
    config: ModelScorerConfig,
    client: reqwest::Client,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    text: String,
}

/// The JSON contract every model response must satisfy
#[derive(Debug, Deserialize)]
struct ScorePayload {
    score_1_to_5: f64,
    reason: String,
}

impl ModelScorer {
    /// Create a new model scorer
    pub fn new(config: ModelScorerConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ThemisError::Config(config::ConfigError::Message(
                "API key cannot be empty".to_string(),
            )));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Call the messages API once with the rendered prompt
    async fn call_api(&self, prompt: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(ThemisError::LlmApi(format!(
                "API error (status {}): {}",
                status, error_text
            )));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ThemisError::LlmApi(format!("Malformed API response: {}", e)))?;

        Ok(parsed
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    /// Parse the model output against the score contract.
    /// Tolerates markdown code fences around the JSON; anything else fails.
    fn parse_score_response(raw: &str) -> Result<(f64, String)> {
        let cleaned = strip_code_fences(raw.trim());

        let payload: ScorePayload = serde_json::from_str(cleaned).map_err(|e| {
            ThemisError::LlmApi(format!(
                "Model output does not match the score contract: {} (output: {:.100})",
                e, raw
            ))
        })?;

        Ok((payload.score_1_to_5, payload.reason))
    }
}

/// Strip a surrounding markdown code fence, if present
fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text;
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

#[async_trait]
impl Scorer for ModelScorer {
    async fn score(
        &self,
        submetric: &str,
        project_text: &str,
        exemplars: &[Exemplar],
    ) -> Result<SubMetricScore> {
        let prompt = prompts::lookup(submetric)?;
        let rendered = prompt.render(project_text, exemplars);

        debug!(
            "Scoring sub-metric {} with model {}",
            prompt.key, self.config.model
        );

        let raw = self.call_api(&rendered).await?;
        let (score, reason) = Self::parse_score_response(&raw)?;

        // Range validation happens in the constructor: out-of-range model
        // output is an InvalidScore error, not a clamped value.
        SubMetricScore::new(prompt.key, prompt.name, round2(score), reason)
    }

    fn kind(&self) -> &'static str {
        "model"
    }
}
