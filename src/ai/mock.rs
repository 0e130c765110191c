use super::{EmbeddingService, InferenceService, ModelRequest, PromptPart};
use crate::models::{Embedding, ModelResponse};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory [`InferenceService`] that records requests and replays canned
/// responses in order, cycling when exhausted.
#[derive(Clone)]
pub struct MockInferenceClient {
    responses: Arc<Mutex<Vec<ModelResponse>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: ModelResponse) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceService for MockInferenceClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response echoes the prompt text
            let echoed: Vec<&str> = request
                .parts()
                .iter()
                .filter_map(|part| match part {
                    PromptPart::Text(text) => Some(text.as_str()),
                    PromptPart::Image { .. } => None,
                })
                .collect();
            Ok(ModelResponse::text(format!("Echo: {}", echoed.join(" "))))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

/// In-memory [`EmbeddingService`] returning a fixed-size vector per text.
#[derive(Clone)]
pub struct MockEmbeddingClient {
    dimensions: usize,
    call_count: Arc<Mutex<usize>>,
}

impl MockEmbeddingClient {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingClient {
    async fn embed_text(&self, text: &str) -> Result<Embedding> {
        *self.call_count.lock().unwrap() += 1;

        let seed = text.len() as f32;
        Ok(Embedding {
            values: (0..self.dimensions)
                .map(|i| ((i as f32) + seed).sin())
                .collect(),
            input_token_count: Some(text.split_whitespace().count() as u32),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::PromptBuilder;
    use crate::guardrail::GuardrailHandle;
    use crate::models::{
        GenerationParams, GuardrailAction, GuardrailTrace, ModelOutput,
        DEFAULT_TITAN_TEXT_MODEL_ID,
    };

    fn request(text: &str) -> ModelRequest {
        PromptBuilder::new(DEFAULT_TITAN_TEXT_MODEL_ID, GenerationParams::new(100, 0.5))
            .unwrap()
            .build_text_only(text)
            .unwrap()
    }

    #[tokio::test]
    async fn test_mock_default_echoes_prompt() {
        let client = MockInferenceClient::new();
        let response = client.invoke(&request("running shoes")).await.unwrap();
        assert_eq!(
            response.output,
            ModelOutput::Text("Echo: running shoes".to_string())
        );
    }

    #[tokio::test]
    async fn test_mock_cycles_responses_and_records_requests() {
        let client = MockInferenceClient::new()
            .with_response(ModelResponse::text("first"))
            .with_response(ModelResponse::text("second"));

        let texts: Vec<String> = {
            let mut out = Vec::new();
            for prompt in ["a", "b", "c"] {
                out.push(client.invoke(&request(prompt)).await.unwrap().output.to_string());
            }
            out
        };

        assert_eq!(texts, vec!["first", "second", "first"]);
        assert_eq!(client.get_call_count(), 3);
        assert_eq!(
            client.get_requests()[1].parts(),
            &[PromptPart::Text("b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_invoke_guarded_attaches_handle_and_substitutes_message() {
        let client = MockInferenceClient::new().with_response(
            ModelResponse::text("raw model output").with_trace(GuardrailTrace {
                action: GuardrailAction::Intervened,
                detail: None,
            }),
        );
        let handle = GuardrailHandle {
            id: "gr-1".to_string(),
            version: "3".to_string(),
            arn: None,
            created_at: None,
            blocked_input_message: "blocked in".to_string(),
            blocked_output_message: "blocked out".to_string(),
        };

        let response = client
            .invoke_guarded(&request("anything"), &handle)
            .await
            .unwrap();

        assert_eq!(response.output, ModelOutput::Text("blocked out".to_string()));
        let sent = &client.get_requests()[0];
        let attachment = sent.guardrail().unwrap();
        assert_eq!(attachment.identifier, "gr-1");
        assert_eq!(attachment.version, "3");
    }

    #[tokio::test]
    async fn test_mock_embedding_has_fixed_dimensions() {
        let client = MockEmbeddingClient::new(8);
        let first = client.embed_text("hello world").await.unwrap();
        let second = client.embed_text("something else entirely").await.unwrap();
        assert_eq!(first.dimensions(), 8);
        assert_eq!(second.dimensions(), 8);
        assert_eq!(first.input_token_count, Some(2));
        assert_eq!(client.get_call_count(), 2);
    }
}
