use crate::guardrail::GuardrailAttachment;
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const GUARDRAIL_IDENTIFIER_HEADER: &str = "X-Amzn-Bedrock-GuardrailIdentifier";
pub const GUARDRAIL_VERSION_HEADER: &str = "X-Amzn-Bedrock-GuardrailVersion";
pub const TRACE_HEADER: &str = "X-Amzn-Bedrock-Trace";

/// Lightweight Bedrock REST client shared by the runtime and control-plane
/// modules.
///
/// Authenticates with a Bedrock API key sent as a bearer token.
#[derive(Clone)]
pub struct BedrockHttpClient {
    pub(crate) client: Client,
    api_key: String,
    runtime_url: String,
    control_url: String,
    timeout: Duration,
}

impl BedrockHttpClient {
    /// Construct a client for the public endpoints of `region`.
    pub fn new(api_key: String, region: &str, timeout: Duration) -> Self {
        Self::new_with_client(api_key, region, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        region: &str,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            runtime_url: format!("https://bedrock-runtime.{}.amazonaws.com", region),
            control_url: format!("https://bedrock.{}.amazonaws.com", region),
            timeout,
        }
    }

    /// Point the client at explicit runtime and control-plane base URLs.
    pub fn with_endpoints(mut self, runtime_url: String, control_url: String) -> Self {
        self.runtime_url = runtime_url.trim_end_matches('/').to_string();
        self.control_url = control_url.trim_end_matches('/').to_string();
        self
    }

    /// Calls `InvokeModel` and returns the raw response body.
    ///
    /// Response parsing is left to the caller because each provider
    /// family answers with its own schema.
    pub async fn invoke_model<Req: Serialize>(
        &self,
        model_id: &str,
        body: &Req,
        guardrail: Option<&GuardrailAttachment>,
    ) -> Result<String> {
        let url = format!("{}/model/{}/invoke", self.runtime_url, model_id);

        let mut request = self.authorized(self.client.post(&url)).json(body);
        if let Some(guardrail) = guardrail {
            request = request
                .header(GUARDRAIL_IDENTIFIER_HEADER, &guardrail.identifier)
                .header(GUARDRAIL_VERSION_HEADER, &guardrail.version)
                .header(TRACE_HEADER, "ENABLED");
        }

        tracing::debug!(
            "Invoking Bedrock model {} (guardrail: {})",
            model_id,
            guardrail.map_or("none", |g| g.identifier.as_str())
        );

        self.send(request).await
    }

    /// Calls the control-plane `CreateGuardrail` operation.
    pub async fn create_guardrail<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/guardrails", self.control_url);
        let body = self
            .send(self.authorized(self.client.post(&url)).json(request))
            .await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse CreateGuardrail response: {}\nBody: {}", e, body);
            Error::MalformedResponse(format!("Failed to parse CreateGuardrail response: {}", e))
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Bedrock: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Bedrock API error (status {}): {}", status, error_text);
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.text().await?)
    }
}
