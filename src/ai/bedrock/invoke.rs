//! Bedrock `InvokeModel` client and per-provider response parsing.

use super::client::BedrockHttpClient;
use super::types::{AnthropicResponse, GuardrailEnvelope, MistralResponse, TitanTextResponse};
use crate::ai::{InferenceService, ModelRequest};
use crate::models::{GuardrailTrace, ModelProvider, ModelResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Bedrock implementation of [`InferenceService`].
pub struct BedrockInferenceClient {
    http: BedrockHttpClient,
}

impl BedrockInferenceClient {
    pub fn from_http(http: BedrockHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl InferenceService for BedrockInferenceClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let body = request.body()?;
        let raw = self
            .http
            .invoke_model(request.model_id(), &body, request.guardrail())
            .await?;

        parse_response(request.provider(), &raw)
    }
}

/// Extract the normalized response for `provider` from a raw model body.
pub fn parse_response(provider: ModelProvider, raw: &str) -> Result<ModelResponse> {
    let response = match provider {
        ModelProvider::Mistral => parse_mistral(raw)?,
        ModelProvider::Anthropic => parse_anthropic(raw)?,
        ModelProvider::TitanText => parse_titan_text(raw)?,
    };

    let envelope: GuardrailEnvelope = decode(provider, raw)?;
    Ok(match envelope.action {
        Some(action) => response.with_trace(GuardrailTrace {
            action,
            detail: envelope.trace.and_then(|trace| trace.guardrail),
        }),
        None => response,
    })
}

fn parse_mistral(raw: &str) -> Result<ModelResponse> {
    let response: MistralResponse = decode(ModelProvider::Mistral, raw)?;
    if response.outputs.is_empty() {
        return Err(Error::MalformedResponse(
            "Mistral response has no outputs".to_string(),
        ));
    }
    Ok(ModelResponse::completions(
        response.outputs.into_iter().map(|output| output.text).collect(),
    ))
}

fn parse_anthropic(raw: &str) -> Result<ModelResponse> {
    let response: AnthropicResponse = decode(ModelProvider::Anthropic, raw)?;
    response
        .content
        .into_iter()
        .find(|block| block.block_type == "text")
        .and_then(|block| block.text)
        .map(ModelResponse::text)
        .ok_or_else(|| {
            Error::MalformedResponse("Anthropic response has no text content block".to_string())
        })
}

fn parse_titan_text(raw: &str) -> Result<ModelResponse> {
    let response: TitanTextResponse = decode(ModelProvider::TitanText, raw)?;
    response
        .results
        .into_iter()
        .next()
        .map(|result| ModelResponse::text(result.output_text))
        .ok_or_else(|| Error::MalformedResponse("Titan response has no results".to_string()))
}

fn decode<T: DeserializeOwned>(provider: ModelProvider, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::error!(
            "Failed to parse {} response: {}\nBody: {}",
            provider.name(),
            e,
            raw
        );
        Error::MalformedResponse(format!("Failed to parse {} response: {}", provider.name(), e))
    })
}
