//! Titan embedding client implementation.
//!
//! Embeds one text per `InvokeModel` call.

use super::client::BedrockHttpClient;
use super::types::{TitanEmbeddingRequest, TitanEmbeddingResponse};
use crate::ai::EmbeddingService;
use crate::models::Embedding;
use crate::{Error, Result};
use async_trait::async_trait;

/// Output dimensionality of `amazon.titan-embed-text-v1`.
pub const TITAN_EMBED_V1_DIMENSIONS: usize = 1536;

/// Titan implementation of [`EmbeddingService`].
pub struct TitanEmbeddingClient {
    http: BedrockHttpClient,
    model_id: String,
    expected_dimensions: Option<usize>,
}

impl TitanEmbeddingClient {
    pub fn new(http: BedrockHttpClient, model_id: String) -> Self {
        let expected_dimensions =
            (model_id == "amazon.titan-embed-text-v1").then_some(TITAN_EMBED_V1_DIMENSIONS);
        Self {
            http,
            model_id,
            expected_dimensions,
        }
    }

    /// Fail any response whose vector length differs from `dimensions`.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.expected_dimensions = Some(dimensions);
        self
    }
}

#[async_trait]
impl EmbeddingService for TitanEmbeddingClient {
    async fn embed_text(&self, text: &str) -> Result<Embedding> {
        if text.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Embedding input must not be empty".to_string(),
            ));
        }

        let request = TitanEmbeddingRequest {
            input_text: text.to_string(),
        };
        let raw = self.http.invoke_model(&self.model_id, &request, None).await?;

        let response: TitanEmbeddingResponse = serde_json::from_str(&raw).map_err(|e| {
            tracing::error!("Failed to parse Titan embedding response: {}\nBody: {}", e, raw);
            Error::MalformedResponse(format!("Failed to parse Titan embedding response: {}", e))
        })?;

        if response.embedding.is_empty() {
            return Err(Error::MalformedResponse(
                "Titan returned an empty embedding".to_string(),
            ));
        }

        if let Some(expected) = self.expected_dimensions {
            if response.embedding.len() != expected {
                return Err(Error::MalformedResponse(format!(
                    "Expected {} embedding dimensions from {}, got {}",
                    expected,
                    self.model_id,
                    response.embedding.len()
                )));
            }
        }

        Ok(Embedding {
            values: response.embedding,
            input_token_count: response.input_text_token_count,
        })
    }
}
