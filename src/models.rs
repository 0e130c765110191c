//! Data models and structures
//!
//! Defines the provider catalogue, generation parameters, normalized model
//! responses, and the environment-driven configuration.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Bedrock model families this crate knows how to talk to.
///
/// Each family has its own request body and response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    /// Instruction-tuned open models framed with `<s>[INST] ... [/INST]`.
    Mistral,
    /// Message-list models accepting text and image content parts.
    Anthropic,
    /// Amazon Titan text generation models.
    TitanText,
}

/// Cross-region inference profile prefixes that may precede a model id.
const INFERENCE_PROFILE_PREFIXES: [&str; 3] = ["us.", "eu.", "apac."];

impl ModelProvider {
    /// Resolve the provider family from a Bedrock model id.
    pub fn from_model_id(model_id: &str) -> Result<Self> {
        let bare = INFERENCE_PROFILE_PREFIXES
            .iter()
            .find_map(|prefix| model_id.strip_prefix(prefix))
            .unwrap_or(model_id);

        if bare.starts_with("mistral.") {
            Ok(Self::Mistral)
        } else if bare.starts_with("anthropic.") {
            Ok(Self::Anthropic)
        } else if bare.starts_with("amazon.titan-text") {
            Ok(Self::TitanText)
        } else {
            Err(Error::Config(format!(
                "Unsupported model id '{}': expected a mistral, anthropic, or titan-text model",
                model_id
            )))
        }
    }

    /// Whether image content parts may be sent to this provider.
    pub fn accepts_images(&self) -> bool {
        matches!(self, Self::Anthropic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mistral => "mistral",
            Self::Anthropic => "anthropic",
            Self::TitanText => "titan-text",
        }
    }
}

/// Sampling parameters sent with every generation request.
///
/// Both fields are required and have no default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Text extracted from a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    Text(String),
    Completions(Vec<String>),
}

impl ModelOutput {
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::Completions(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for ModelOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Completions(items) => f.write_str(&items.join("\n")),
        }
    }
}

/// Value of the `amazon-bedrock-guardrailAction` response field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardrailAction {
    None,
    Intervened,
}

/// Which side of the exchange a guardrail blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedStage {
    Input,
    Output,
}

/// Guardrail outcome reported alongside a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardrailTrace {
    pub action: GuardrailAction,
    /// Raw `amazon-bedrock-trace.guardrail` object, when tracing was enabled.
    pub detail: Option<serde_json::Value>,
}

impl GuardrailTrace {
    pub fn intervened(&self) -> bool {
        self.action == GuardrailAction::Intervened
    }

    /// `Input` when a policy in the input assessment blocked the prompt.
    ///
    /// InvokeModel traces key the assessment as `input`, Converse traces as
    /// `inputAssessment`. Everything else counts as an output block.
    pub fn blocked_stage(&self) -> BlockedStage {
        let input_blocked = self.detail.as_ref().is_some_and(|detail| {
            ["input", "inputAssessment"]
                .iter()
                .filter_map(|key| detail.get(*key))
                .any(contains_blocked_action)
        });

        if input_blocked {
            BlockedStage::Input
        } else {
            BlockedStage::Output
        }
    }
}

fn contains_blocked_action(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Object(map) => {
            map.get("action").and_then(|action| action.as_str()) == Some("BLOCKED")
                || map.values().any(contains_blocked_action)
        }
        serde_json::Value::Array(items) => items.iter().any(contains_blocked_action),
        _ => false,
    }
}

/// Normalized result of one model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub output: ModelOutput,
    pub guardrail: Option<GuardrailTrace>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            output: ModelOutput::Text(text.into()),
            guardrail: None,
        }
    }

    pub fn completions(items: Vec<String>) -> Self {
        Self {
            output: ModelOutput::Completions(items),
            guardrail: None,
        }
    }

    pub fn with_trace(mut self, trace: GuardrailTrace) -> Self {
        self.guardrail = Some(trace);
        self
    }

    /// True when the guardrail replaced or blocked the model's output.
    pub fn is_blocked(&self) -> bool {
        self.guardrail.as_ref().is_some_and(GuardrailTrace::intervened)
    }
}

/// Dense vector returned by an embedding model.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
    pub input_token_count: Option<u32>,
}

impl Embedding {
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }
}

// Configuration

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MISTRAL_MODEL_ID: &str = "mistral.mixtral-8x7b-instruct-v0:1";
pub const DEFAULT_CLAUDE_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const DEFAULT_TITAN_TEXT_MODEL_ID: &str = "amazon.titan-text-lite-v1";
pub const DEFAULT_TITAN_EMBED_MODEL_ID: &str = "amazon.titan-embed-text-v1";
pub const DEFAULT_GUARDRAIL_VERSION: &str = "DRAFT";
pub const DEFAULT_UPLOAD_DIR: &str = "uploaded_images";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub region: String,
    pub runtime_url: String,
    pub control_url: String,
    pub mistral_model_id: String,
    pub claude_model_id: String,
    pub titan_text_model_id: String,
    pub titan_embed_model_id: String,
    pub guardrail_id: Option<String>,
    pub guardrail_version: String,
    pub upload_dir: PathBuf,
    pub request_timeout: Duration,
    pub resize_images: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment
    /// in production, a map in tests). Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("BEDROCK_API_KEY")
            .or_else(|| get("AWS_BEARER_TOKEN_BEDROCK"))
            .ok_or_else(|| {
                Error::Config("BEDROCK_API_KEY (or AWS_BEARER_TOKEN_BEDROCK) not set".to_string())
            })?;

        let region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());

        let runtime_url = get("BEDROCK_RUNTIME_URL")
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", region));
        let control_url = get("BEDROCK_CONTROL_URL")
            .unwrap_or_else(|| format!("https://bedrock.{}.amazonaws.com", region));

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    Error::Config(format!(
                        "REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let resize_images = match get("RESIZE_IMAGES") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                Error::Config(format!("RESIZE_IMAGES must be true or false, got '{}'", raw))
            })?,
            None => false,
        };

        Ok(Self {
            api_key,
            runtime_url: runtime_url.trim_end_matches('/').to_string(),
            control_url: control_url.trim_end_matches('/').to_string(),
            region,
            mistral_model_id: get("MISTRAL_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_MISTRAL_MODEL_ID.to_string()),
            claude_model_id: get("CLAUDE_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL_ID.to_string()),
            titan_text_model_id: get("TITAN_TEXT_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_TITAN_TEXT_MODEL_ID.to_string()),
            titan_embed_model_id: get("TITAN_EMBED_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_TITAN_EMBED_MODEL_ID.to_string()),
            guardrail_id: get("GUARDRAIL_ID"),
            guardrail_version: get("GUARDRAIL_VERSION")
                .unwrap_or_else(|| DEFAULT_GUARDRAIL_VERSION.to_string()),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            request_timeout,
            resize_images,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
