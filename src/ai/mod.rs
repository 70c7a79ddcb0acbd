//! Remote inference strategy
//!
//! Scores text through any OpenAI-compatible chat completion endpoint. The
//! model is asked for a strict JSON object:
//!
//! ```json
//! { "authenticity": 0.82, "indicators": ["..."], "reasoning": "..." }
//! ```
//!
//! ## Key Discovery
//!
//! Auto-discovers API keys from environment variables:
//! - `VERACITY_AI_KEY` + `VERACITY_AI_ENDPOINT` (+ optional `VERACITY_AI_MODEL`) → custom endpoint
//! - `OPENAI_API_KEY` → OpenAI
//! - `GROQ_API_KEY` → Groq
//! - `TOGETHER_API_KEY` → Together AI
//! - `OPENROUTER_API_KEY` → OpenRouter
//! - `DEEPSEEK_API_KEY` → DeepSeek
//!
//! Keys are used round-robin to spread load across rate limits. Transport
//! failures, error statuses and unparsable replies all surface as
//! `StrategyUnavailable`; nothing is ever guessed.

use crate::content::{ContentKind, ContentSubmission};
use crate::detection::{
    unsupported, AnalysisContext, DetectionDetails, DetectionOutput, DetectionStrategy, RawScore,
};
use crate::{VeracityError, VeracityResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Characters of submitted text forwarded to the model
const MAX_PROMPT_CHARS: usize = 8_000;

const STRATEGY_NAME: &str = "remote-inference";

/// Configuration for the remote inference strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteInferenceConfig {
    /// Explicit key pool, used before any discovered keys
    pub api_keys: Vec<ApiKeyEntry>,
    /// Maximum tokens per completion
    pub max_tokens: usize,
    /// Whether to auto-discover keys from environment variables
    pub auto_discover_keys: bool,
    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    pub provider: String,
    pub key: String,
    pub endpoint: String,
    pub model: String,
    /// Inactive keys stay in the pool but are never used
    pub active: bool,
}

impl ApiKeyEntry {
    pub fn new(
        provider: impl Into<String>,
        key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            key: key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            active: true,
        }
    }
}

impl Default for RemoteInferenceConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            max_tokens: 1024,
            auto_discover_keys: true,
            request_timeout_seconds: 25,
        }
    }
}

/// Known providers and their OpenAI-compatible endpoints
const PROVIDER_MAP: &[(&str, &str, &str, &str)] = &[
    // (env_var, provider_name, endpoint, default_model)
    ("OPENAI_API_KEY", "openai", "https://api.openai.com/v1/chat/completions", "gpt-4o-mini"),
    ("GROQ_API_KEY", "groq", "https://api.groq.com/openai/v1/chat/completions", "llama-3.3-70b-versatile"),
    ("TOGETHER_API_KEY", "together", "https://api.together.xyz/v1/chat/completions", "meta-llama/Llama-3.3-70B-Instruct-Turbo"),
    ("OPENROUTER_API_KEY", "openrouter", "https://openrouter.ai/api/v1/chat/completions", "openai/gpt-4o-mini"),
    ("DEEPSEEK_API_KEY", "deepseek", "https://api.deepseek.com/v1/chat/completions", "deepseek-chat"),
];

/// Response shape from OpenAI-compatible APIs
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// JSON object the model is asked to return
#[derive(Debug, Deserialize)]
struct InferenceReply {
    authenticity: Option<f64>,
    indicators: Option<Vec<String>>,
    reasoning: Option<String>,
}

/// Parsed model verdict
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAssessment {
    pub score: RawScore,
    pub indicators: Vec<String>,
    pub reasoning: String,
}

/// Text strategy backed by a hosted language model
pub struct RemoteInferenceStrategy {
    config: RemoteInferenceConfig,
    keys: Vec<ApiKeyEntry>,
    key_index: Arc<RwLock<usize>>,
    client: reqwest::Client,
}

impl RemoteInferenceStrategy {
    pub fn new(config: RemoteInferenceConfig) -> Self {
        let mut keys = config.api_keys.clone();

        if config.auto_discover_keys {
            for dk in Self::discover_keys() {
                if !keys.iter().any(|k| k.provider == dk.provider) {
                    keys.push(dk);
                }
            }
        }

        let active: Vec<&str> = keys
            .iter()
            .filter(|k| k.active)
            .map(|k| k.provider.as_str())
            .collect();
        if active.is_empty() {
            tracing::info!(
                "Remote inference initialized without API keys; \
                 set VERACITY_AI_KEY or OPENAI_API_KEY to enable it"
            );
        } else {
            tracing::info!(
                "Remote inference initialized with {} active key(s): {}",
                active.len(),
                active.join(", ")
            );
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            config,
            keys,
            key_index: Arc::new(RwLock::new(0)),
            client,
        }
    }

    /// Discover API keys from well-known environment variables
    fn discover_keys() -> Vec<ApiKeyEntry> {
        let mut keys = Vec::new();

        if let (Ok(key), Ok(endpoint)) = (
            std::env::var("VERACITY_AI_KEY"),
            std::env::var("VERACITY_AI_ENDPOINT"),
        ) {
            if !key.is_empty() && !endpoint.is_empty() {
                let model =
                    std::env::var("VERACITY_AI_MODEL").unwrap_or_else(|_| "default".to_string());
                tracing::debug!("Discovered custom inference endpoint {}", endpoint);
                keys.push(ApiKeyEntry::new("custom", key, endpoint, model));
            }
        }

        for &(env_var, provider, endpoint, model) in PROVIDER_MAP {
            if let Ok(key) = std::env::var(env_var) {
                if !key.is_empty() {
                    tracing::debug!("Discovered {} API key from {}", provider, env_var);
                    keys.push(ApiKeyEntry::new(provider, key, endpoint, model));
                }
            }
        }

        keys
    }

    /// Whether at least one active key is configured
    pub fn is_available(&self) -> bool {
        self.keys.iter().any(|k| k.active)
    }

    /// Next active key, round-robin
    async fn next_key(&self) -> Option<&ApiKeyEntry> {
        let active: Vec<_> = self.keys.iter().filter(|k| k.active).collect();
        if active.is_empty() {
            return None;
        }

        let mut idx = self.key_index.write().await;
        let key = active[*idx % active.len()];
        *idx = idx.wrapping_add(1);
        Some(key)
    }

    fn unavailable(reason: impl Into<String>) -> VeracityError {
        VeracityError::StrategyUnavailable {
            strategy: STRATEGY_NAME.to_string(),
            reason: reason.into(),
        }
    }

    async fn call_api(&self, key: &ApiKeyEntry, prompt: &str) -> VeracityResult<String> {
        let body = serde_json::json!({
            "model": key.model,
            "max_tokens": self.config.max_tokens,
            "temperature": 0.0,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a fact-checking and media forensics analyst. Always respond with valid JSON."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(&key.endpoint)
            .header("Authorization", format!("Bearer {}", key.key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::unavailable(format!("request to {} failed: {}", key.provider, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let excerpt: String = error_body.chars().take(200).collect();
            return Err(Self::unavailable(format!(
                "{} returned {}: {}",
                key.provider, status, excerpt
            )));
        }

        let resp: ChatCompletionResponse = response.json().await.map_err(|e| {
            Self::unavailable(format!("malformed response from {}: {}", key.provider, e))
        })?;

        resp.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Self::unavailable(format!("empty response from {}", key.provider)))
    }

    /// Build the analysis prompt for one text
    pub fn build_prompt(text: &str) -> String {
        let excerpt: String = text.chars().take(MAX_PROMPT_CHARS).collect();
        let truncated = if excerpt.len() < text.len() {
            "\n(The text was truncated.)"
        } else {
            ""
        };

        format!(
            "Assess whether the following text is authentic, accurate information or \
             misinformation (fabricated, manipulated or misleading).\n\n\
             ## Text\n```\n{}\n```{}\n\n\
             ## Your Task\n\
             1. Estimate the probability that the text is authentic (0.0-1.0).\n\
             2. List the concrete indicators that drove your estimate.\n\
             3. Explain your reasoning in one or two sentences.\n\n\
             Respond in JSON format:\n\
             ```json\n\
             {{\n\
               \"authenticity\": 0.5,\n\
               \"indicators\": [\"...\"],\n\
               \"reasoning\": \"...\"\n\
             }}\n\
             ```",
            excerpt, truncated
        )
    }

    /// Parse the model reply, tolerating prose or code fences around the JSON
    pub fn parse_reply(raw: &str) -> VeracityResult<RemoteAssessment> {
        let json_str = match (raw.find('{'), raw.rfind('}')) {
            (Some(start), Some(end)) if start < end => &raw[start..=end],
            _ => return Err(Self::unavailable("reply contained no JSON object")),
        };

        let reply: InferenceReply = serde_json::from_str(json_str)
            .map_err(|e| Self::unavailable(format!("unparsable reply: {}", e)))?;

        let value = reply
            .authenticity
            .ok_or_else(|| Self::unavailable("reply has no authenticity estimate"))?;
        // Some models answer in whole percent
        let value = if value > 1.0 && value <= 100.0 && value.fract() == 0.0 {
            value / 100.0
        } else {
            value
        };
        let score = RawScore::new(value)
            .ok_or_else(|| Self::unavailable(format!("authenticity {} outside [0, 1]", value)))?;

        Ok(RemoteAssessment {
            score,
            indicators: reply.indicators.unwrap_or_default(),
            reasoning: reply
                .reasoning
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "The model gave no reasoning.".into()),
        })
    }
}

impl Default for RemoteInferenceStrategy {
    fn default() -> Self {
        Self::new(RemoteInferenceConfig::default())
    }
}

#[async_trait]
impl DetectionStrategy for RemoteInferenceStrategy {
    fn name(&self) -> &str {
        STRATEGY_NAME
    }

    fn supports(&self, kind: ContentKind) -> bool {
        kind == ContentKind::Text
    }

    async fn analyze(
        &self,
        submission: &ContentSubmission,
        ctx: &AnalysisContext,
    ) -> VeracityResult<DetectionOutput> {
        let text = submission
            .text_payload()
            .ok_or_else(|| unsupported(STRATEGY_NAME, "only inline text can be sent for inference"))?;

        let key = self
            .next_key()
            .await
            .ok_or_else(|| Self::unavailable("no API key configured"))?;
        ctx.ensure_active(STRATEGY_NAME)?;

        let raw = self.call_api(key, &Self::build_prompt(text)).await?;
        ctx.ensure_active(STRATEGY_NAME)?;
        tracing::debug!(
            "Inference reply from {} ({}): {} chars",
            key.provider,
            key.model,
            raw.len()
        );

        let assessment = Self::parse_reply(&raw)?;
        Ok(DetectionOutput::new(assessment.score, assessment.reasoning.clone()).with_details(
            DetectionDetails {
                method: "Language model assessment".into(),
                model_used: format!("{}/{}", key.provider, key.model),
                key_indicators: assessment.indicators,
                technical_analysis: format!(
                    "authenticity={:.3} via {}",
                    assessment.score.value(),
                    key.endpoint
                ),
            },
        ))
    }
}
