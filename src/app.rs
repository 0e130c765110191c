//! Application flows: the model playground, embeddings, and the retail
//! assistant.

use crate::ai::{
    BedrockHttpClient, BedrockInferenceClient, EmbeddingService, InferenceService, PromptBuilder,
    TitanEmbeddingClient,
};
use crate::guardrail::{retail_policy, BedrockPolicyClient, GuardrailRegistry};
use crate::image::{ImageUpload, UploadStore};
use crate::models::{Config, Embedding, GenerationParams, ModelResponse};
use crate::{Error, Result};
use tracing::info;

const MISTRAL_CHAT_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 200,
    temperature: 0.5,
};
const CLAUDE_CHAT_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 1000,
    temperature: 0.5,
};
const RETAIL_IMAGE_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 4096,
    temperature: 1.0,
};
const RETAIL_TEXT_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 512,
    temperature: 0.5,
};

/// Edge length uploads are shrunk to when resizing is enabled.
const RESIZE_EDGE: u32 = 256;

/// Models selectable in the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaygroundModel {
    Mistral,
    Claude,
}

/// Model ids used by each flow.
#[derive(Debug, Clone)]
pub struct ModelIds {
    pub mistral: String,
    pub claude: String,
    pub titan_text: String,
}

impl ModelIds {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mistral: config.mistral_model_id.clone(),
            claude: config.claude_model_id.clone(),
            titan_text: config.titan_text_model_id.clone(),
        }
    }
}

pub struct App {
    inference: Box<dyn InferenceService>,
    embeddings: Box<dyn EmbeddingService>,
    guardrails: GuardrailRegistry,
    uploads: UploadStore,
    models: ModelIds,
    resize_images: bool,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub inference: Box<dyn InferenceService>,
    pub embeddings: Box<dyn EmbeddingService>,
    pub guardrails: GuardrailRegistry,
    pub uploads: UploadStore,
}

impl App {
    pub fn with_services(services: AppServices, models: ModelIds, resize_images: bool) -> Self {
        Self {
            inference: services.inference,
            embeddings: services.embeddings,
            guardrails: services.guardrails,
            uploads: services.uploads,
            models,
            resize_images,
        }
    }

    /// Wire the Bedrock-backed services described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        // One connection pool shared by the runtime and control-plane clients.
        let http = BedrockHttpClient::new(
            config.api_key.clone(),
            &config.region,
            config.request_timeout,
        )
        .with_endpoints(config.runtime_url.clone(), config.control_url.clone());

        let policy_service = Box::new(BedrockPolicyClient::new(http.clone()));
        let guardrails = match &config.guardrail_id {
            Some(id) => {
                info!("Using configured guardrail {} ({})", id, config.guardrail_version);
                GuardrailRegistry::with_existing(
                    policy_service,
                    retail_policy(),
                    id.clone(),
                    config.guardrail_version.clone(),
                )
            }
            None => GuardrailRegistry::new(
                policy_service,
                retail_policy(),
                config.guardrail_version.clone(),
            ),
        };

        let uploads = UploadStore::new(&config.upload_dir);

        Ok(Self::with_services(
            AppServices {
                inference: Box::new(BedrockInferenceClient::from_http(http.clone())),
                embeddings: Box::new(TitanEmbeddingClient::new(
                    http,
                    config.titan_embed_model_id.clone(),
                )),
                guardrails,
                uploads,
            },
            ModelIds::from_config(config),
            config.resize_images,
        ))
    }

    pub fn guardrails(&self) -> &GuardrailRegistry {
        &self.guardrails
    }

    /// Send free text to the chosen playground model, unguarded.
    pub async fn chat(&self, model: PlaygroundModel, text: &str) -> Result<ModelResponse> {
        let builder = match model {
            PlaygroundModel::Mistral => {
                PromptBuilder::new(&self.models.mistral, MISTRAL_CHAT_PARAMS)?
            }
            PlaygroundModel::Claude => {
                PromptBuilder::new(&self.models.claude, CLAUDE_CHAT_PARAMS)?
            }
        };
        let request = builder.build_text_only(text)?;

        info!("Playground request to {}", request.model_id());
        self.inference.invoke(&request).await
    }

    /// Answer a shopper's question.
    ///
    /// Questions with an image go to the multi-modal model; text-only
    /// questions go through the retail guardrail.
    pub async fn ask(&self, text: &str, image: Option<&ImageUpload>) -> Result<ModelResponse> {
        if text.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Question must not be empty".to_string(),
            ));
        }

        match image {
            Some(upload) => {
                let path = self.uploads.save(upload)?;
                let mut builder = PromptBuilder::new(&self.models.claude, RETAIL_IMAGE_PARAMS)?;
                if self.resize_images {
                    builder = builder.with_resize(RESIZE_EDGE, RESIZE_EDGE);
                }
                let request = builder.build_multi_modal(&[text], &[Some(&path)])?;

                info!("Retail question with image {}", path.display());
                self.inference.invoke(&request).await
            }
            None => {
                let guardrail = self.guardrails.ensure_policy().await?;
                let request = PromptBuilder::new(&self.models.titan_text, RETAIL_TEXT_PARAMS)?
                    .build_text_only(text)?;

                info!("Retail question guarded by {}", guardrail.id);
                self.inference.invoke_guarded(&request, &guardrail).await
            }
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        let embedding = self.embeddings.embed_text(text).await?;
        info!("Embedded {} chars into {} dimensions", text.len(), embedding.dimensions());
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockEmbeddingClient, MockInferenceClient, PromptPart};
    use crate::guardrail::MockPolicyService;
    use crate::models::{
        GuardrailAction, GuardrailTrace, ModelOutput, ModelProvider, DEFAULT_CLAUDE_MODEL_ID,
        DEFAULT_MISTRAL_MODEL_ID, DEFAULT_TITAN_TEXT_MODEL_ID,
    };
    use crate::prompts::RETAIL_BLOCKED_MESSAGE;
    use tempfile::TempDir;

    struct Harness {
        app: App,
        inference: MockInferenceClient,
        policies: MockPolicyService,
        _dir: TempDir,
    }

    fn harness(inference: MockInferenceClient) -> Harness {
        let dir = TempDir::new().unwrap();
        let policies = MockPolicyService::new().with_guardrail_id("gr-retail".to_string());

        let app = App::with_services(
            AppServices {
                inference: Box::new(inference.clone()),
                embeddings: Box::new(MockEmbeddingClient::new(16)),
                guardrails: GuardrailRegistry::new(
                    Box::new(policies.clone()),
                    retail_policy(),
                    "DRAFT".to_string(),
                ),
                uploads: UploadStore::new(&dir.path().join("uploaded_images")),
            },
            ModelIds {
                mistral: DEFAULT_MISTRAL_MODEL_ID.to_string(),
                claude: DEFAULT_CLAUDE_MODEL_ID.to_string(),
                titan_text: DEFAULT_TITAN_TEXT_MODEL_ID.to_string(),
            },
            false,
        );

        Harness {
            app,
            inference,
            policies,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_text_question_is_guarded_and_policy_created_once() {
        let h = harness(MockInferenceClient::new());

        h.app.ask("Do you sell running shoes?", None).await.unwrap();
        h.app.ask("What about tennis balls?", None).await.unwrap();

        assert_eq!(h.policies.get_call_count(), 1);
        let requests = h.inference.get_requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.provider(), ModelProvider::TitanText);
            assert_eq!(request.guardrail().unwrap().identifier, "gr-retail");
            assert_eq!(request.guardrail().unwrap().version, "DRAFT");
        }
    }

    #[tokio::test]
    async fn test_blocked_text_question_returns_policy_message() {
        let h = harness(MockInferenceClient::new().with_response(
            ModelResponse::text("Invest in index funds.").with_trace(GuardrailTrace {
                action: GuardrailAction::Intervened,
                detail: None,
            }),
        ));

        let response = h
            .app
            .ask("Where can I invest to get rich?", None)
            .await
            .unwrap();

        assert!(response.is_blocked());
        assert_eq!(
            response.output,
            ModelOutput::Text(RETAIL_BLOCKED_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_image_question_goes_to_claude_unguarded() {
        let h = harness(MockInferenceClient::new().with_response(ModelResponse::text(
            "That is a size 9 trail running shoe.",
        )));
        let upload = ImageUpload::new("shoe.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01]);

        let response = h
            .app
            .ask("What shoe is this?", Some(&upload))
            .await
            .unwrap();

        assert_eq!(response.output.to_string(), "That is a size 9 trail running shoe.");
        assert_eq!(h.policies.get_call_count(), 0);

        let request = &h.inference.get_requests()[0];
        assert_eq!(request.provider(), ModelProvider::Anthropic);
        assert!(request.guardrail().is_none());
        assert_eq!(request.params(), RETAIL_IMAGE_PARAMS);
        assert!(matches!(&request.parts()[0], PromptPart::Text(t) if t == "What shoe is this?"));
        assert!(matches!(&request.parts()[1], PromptPart::Image { .. }));
        assert!(h.app.uploads.dir().join("shoe.jpg").exists());
    }

    #[tokio::test]
    async fn test_image_with_unsupported_type_fails_before_invoking() {
        let h = harness(MockInferenceClient::new());
        let upload = ImageUpload::new("clip.gif", vec![1, 2, 3]);

        let err = h.app.ask("What is this?", Some(&upload)).await.unwrap_err();

        assert!(matches!(err, Error::UnsupportedMediaType(_)));
        assert_eq!(h.inference.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected_without_side_effects() {
        let h = harness(MockInferenceClient::new());

        let err = h.app.ask("   ", None).await.unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(h.inference.get_call_count(), 0);
        assert_eq!(h.policies.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_guardrail_creation_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let inference = MockInferenceClient::new();
        let app = App::with_services(
            AppServices {
                inference: Box::new(inference.clone()),
                embeddings: Box::new(MockEmbeddingClient::new(4)),
                guardrails: GuardrailRegistry::new(
                    Box::new(MockPolicyService::new().with_failures(1)),
                    retail_policy(),
                    "DRAFT".to_string(),
                ),
                uploads: UploadStore::new(dir.path()),
            },
            ModelIds {
                mistral: DEFAULT_MISTRAL_MODEL_ID.to_string(),
                claude: DEFAULT_CLAUDE_MODEL_ID.to_string(),
                titan_text: DEFAULT_TITAN_TEXT_MODEL_ID.to_string(),
            },
            false,
        );

        let err = app.ask("Do you sell bikes?", None).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(inference.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_uses_selected_model_params() {
        let h = harness(MockInferenceClient::new());

        h.app.chat(PlaygroundModel::Mistral, "Hello").await.unwrap();
        h.app.chat(PlaygroundModel::Claude, "Hello").await.unwrap();

        let requests = h.inference.get_requests();
        assert_eq!(requests[0].provider(), ModelProvider::Mistral);
        assert_eq!(requests[0].params(), MISTRAL_CHAT_PARAMS);
        assert_eq!(requests[1].provider(), ModelProvider::Anthropic);
        assert_eq!(requests[1].params(), CLAUDE_CHAT_PARAMS);
        assert!(requests.iter().all(|r| r.guardrail().is_none()));
        assert_eq!(h.policies.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_embed_delegates_to_embedding_service() {
        let h = harness(MockInferenceClient::new());

        let embedding = h.app.embed("Give me a paragraph on cloud providers").await.unwrap();
        assert_eq!(embedding.dimensions(), 16);
    }
}
