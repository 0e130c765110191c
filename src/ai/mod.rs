//! Model invocation over the Bedrock runtime API
//!
//! Provides prompt assembly, the inference and embedding service traits,
//! their Bedrock implementations, and in-memory doubles for tests.

pub mod bedrock;
pub mod mime;
pub mod mock;
pub mod prompt;

pub use bedrock::{BedrockHttpClient, BedrockInferenceClient, TitanEmbeddingClient};
pub use mime::MediaType;
pub use mock::{MockEmbeddingClient, MockInferenceClient};
pub use prompt::{ModelRequest, PromptBuilder, PromptPart};

use crate::guardrail::GuardrailHandle;
use crate::models::{Embedding, ModelOutput, ModelResponse};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Send `request` as built (including any attached guardrail) and
    /// normalize the provider response.
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse>;

    /// Invoke with `guardrail` attached. When the guardrail intervenes the
    /// output is replaced by the policy's blocked message.
    async fn invoke_guarded(
        &self,
        request: &ModelRequest,
        guardrail: &GuardrailHandle,
    ) -> Result<ModelResponse> {
        let guarded = request.clone().with_guardrail(guardrail.attachment());
        let mut response = self.invoke(&guarded).await?;

        if let Some(trace) = response.guardrail.as_ref().filter(|trace| trace.intervened()) {
            let stage = trace.blocked_stage();
            tracing::warn!(
                "Guardrail {} intervened ({:?}): {}",
                guardrail.id,
                stage,
                trace
                    .detail
                    .as_ref()
                    .map(|detail| detail.to_string())
                    .unwrap_or_default()
            );
            response.output = ModelOutput::Text(guardrail.blocked_message(stage).to_string());
        }

        Ok(response)
    }
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_text(&self, text: &str) -> Result<Embedding>;
}
