//! Prompt assembly: turns caller text and image paths into a
//! provider-correct [`ModelRequest`].

use super::bedrock::types::{
    AnthropicContent, AnthropicMessage, AnthropicRequest, ImageSource, MistralRequest,
    RequestBody, TitanTextConfig, TitanTextRequest,
};
use super::mime::MediaType;
use crate::guardrail::GuardrailAttachment;
use crate::models::{GenerationParams, ModelProvider};
use crate::{prompts, Error, Result};
use base64::Engine as _;
use std::path::Path;

/// One piece of prompt content.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    /// Base64-encoded image bytes.
    Image { media_type: MediaType, data: String },
}

/// A fully assembled invocation: which model, what content, how to sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    model_id: String,
    provider: ModelProvider,
    parts: Vec<PromptPart>,
    params: GenerationParams,
    guardrail: Option<GuardrailAttachment>,
}

impl ModelRequest {
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn provider(&self) -> ModelProvider {
        self.provider
    }

    pub fn parts(&self) -> &[PromptPart] {
        &self.parts
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    pub fn guardrail(&self) -> Option<&GuardrailAttachment> {
        self.guardrail.as_ref()
    }

    pub fn with_guardrail(mut self, attachment: GuardrailAttachment) -> Self {
        self.guardrail = Some(attachment);
        self
    }

    /// Render the provider-specific body sent to `InvokeModel`.
    pub fn body(&self) -> Result<RequestBody> {
        let params = self.params;
        match self.provider {
            ModelProvider::Mistral => Ok(RequestBody::Mistral(MistralRequest {
                prompt: prompts::mistral_instruction(&self.text_only()?),
                max_tokens: params.max_tokens,
                temperature: params.temperature,
            })),
            ModelProvider::TitanText => Ok(RequestBody::TitanText(TitanTextRequest {
                input_text: self.text_only()?,
                text_generation_config: TitanTextConfig {
                    max_token_count: params.max_tokens,
                    temperature: params.temperature,
                },
            })),
            ModelProvider::Anthropic => {
                let content = self
                    .parts
                    .iter()
                    .map(|part| match part {
                        PromptPart::Text(text) => AnthropicContent::Text { text: text.clone() },
                        PromptPart::Image { media_type, data } => AnthropicContent::Image {
                            source: ImageSource {
                                source_type: "base64".to_string(),
                                media_type: media_type.mime().to_string(),
                                data: data.clone(),
                            },
                        },
                    })
                    .collect();

                Ok(RequestBody::Anthropic(AnthropicRequest {
                    anthropic_version: prompts::ANTHROPIC_VERSION.to_string(),
                    max_tokens: params.max_tokens,
                    temperature: params.temperature,
                    messages: vec![AnthropicMessage {
                        role: "user".to_string(),
                        content,
                    }],
                }))
            }
        }
    }

    fn text_only(&self) -> Result<String> {
        let mut texts = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            match part {
                PromptPart::Text(text) => texts.push(text.as_str()),
                PromptPart::Image { .. } => {
                    return Err(Error::InvalidArgument(format!(
                        "{} models do not accept image parts",
                        self.provider.name()
                    )))
                }
            }
        }
        Ok(texts.join("\n"))
    }
}

/// Builds [`ModelRequest`]s for a single model.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    model_id: String,
    provider: ModelProvider,
    params: GenerationParams,
    resize: Option<(u32, u32)>,
}

impl PromptBuilder {
    pub fn new(model_id: impl Into<String>, params: GenerationParams) -> Result<Self> {
        let model_id = model_id.into();
        let provider = ModelProvider::from_model_id(&model_id)?;
        Ok(Self {
            model_id,
            provider,
            params,
            resize: None,
        })
    }

    /// Resize every image to `width` x `height` before encoding it.
    pub fn with_resize(mut self, width: u32, height: u32) -> Self {
        self.resize = Some((width, height));
        self
    }

    pub fn provider(&self) -> ModelProvider {
        self.provider
    }

    pub fn build_text_only(&self, text: &str) -> Result<ModelRequest> {
        require_text(text)?;
        Ok(self.request(vec![PromptPart::Text(text.to_string())]))
    }

    /// Text parts come first, then one image part per non-`None` path.
    ///
    /// Providers associate each image with the text preceding it, so this
    /// order is fixed.
    pub fn build_multi_modal<S, P>(
        &self,
        texts: &[S],
        image_paths: &[Option<P>],
    ) -> Result<ModelRequest>
    where
        S: AsRef<str>,
        P: AsRef<Path>,
    {
        let mut parts = Vec::with_capacity(texts.len() + image_paths.len());
        for text in texts {
            let text = text.as_ref();
            require_text(text)?;
            parts.push(PromptPart::Text(text.to_string()));
        }

        let paths: Vec<&Path> = image_paths
            .iter()
            .flatten()
            .map(|path| path.as_ref())
            .collect();
        if !paths.is_empty() && !self.provider.accepts_images() {
            return Err(Error::InvalidArgument(format!(
                "{} models do not accept image parts",
                self.provider.name()
            )));
        }

        for path in paths {
            parts.push(self.image_part(path)?);
        }

        if parts.is_empty() {
            return Err(Error::InvalidArgument(
                "Prompt needs at least one text or image part".to_string(),
            ));
        }

        Ok(self.request(parts))
    }

    fn image_part(&self, path: &Path) -> Result<PromptPart> {
        let media_type = MediaType::from_path(path)?;
        let mut bytes = std::fs::read(path)?;

        match MediaType::sniff(&bytes) {
            Some(sniffed) if sniffed != media_type => tracing::warn!(
                "{} looks like {} but its extension says {}; using the extension",
                path.display(),
                sniffed.as_str(),
                media_type.as_str()
            ),
            _ => {}
        }

        if let Some((width, height)) = self.resize {
            bytes = crate::image::resize_image(&bytes, media_type, width, height)?;
        }

        tracing::debug!(
            "Encoded image part from {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            media_type.mime()
        );

        Ok(PromptPart::Image {
            media_type,
            data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        })
    }

    fn request(&self, parts: Vec<PromptPart>) -> ModelRequest {
        ModelRequest {
            model_id: self.model_id.clone(),
            provider: self.provider,
            parts,
            params: self.params,
            guardrail: None,
        }
    }
}

fn require_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "Prompt text must not be empty".to_string(),
        ));
    }
    Ok(())
}
