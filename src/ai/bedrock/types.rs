//! Bedrock model payloads, one request/response pair per provider family.

use crate::models::GuardrailAction;
use serde::{Deserialize, Serialize};

/// Provider-specific `InvokeModel` body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RequestBody {
    Mistral(MistralRequest),
    Anthropic(AnthropicRequest),
    TitanText(TitanTextRequest),
}

/// Instruction-style completion request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MistralRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnthropicRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: Vec<AnthropicContent>,
}

/// Content part of an Anthropic message.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnthropicContent {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextRequest {
    pub input_text: String,
    pub text_generation_config: TitanTextConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextConfig {
    pub max_token_count: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanEmbeddingRequest {
    pub input_text: String,
}

#[derive(Debug, Deserialize)]
pub struct MistralResponse {
    pub outputs: Vec<MistralOutput>,
}

#[derive(Debug, Deserialize)]
pub struct MistralOutput {
    pub text: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Response content block; only `text` blocks carry output we surface.
#[derive(Debug, Deserialize)]
pub struct AnthropicContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitanTextResponse {
    pub results: Vec<TitanTextResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextResult {
    pub output_text: String,
    #[serde(default)]
    pub completion_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanEmbeddingResponse {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub input_text_token_count: Option<u32>,
}

/// Guardrail fields Bedrock adds to any model body when a guardrail is attached.
#[derive(Debug, Deserialize)]
pub struct GuardrailEnvelope {
    #[serde(rename = "amazon-bedrock-guardrailAction", default)]
    pub action: Option<GuardrailAction>,
    #[serde(rename = "amazon-bedrock-trace", default)]
    pub trace: Option<BedrockTrace>,
}

#[derive(Debug, Deserialize)]
pub struct BedrockTrace {
    #[serde(default)]
    pub guardrail: Option<serde_json::Value>,
}
