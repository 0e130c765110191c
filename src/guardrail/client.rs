use super::policy::{
    FilterCategory, FilterStrength, GuardrailPolicy, ManagedWordList, PiiAction, PiiEntity,
};
use super::{CreatedGuardrail, PolicyService};
use crate::ai::BedrockHttpClient;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGuardrailRequest<'a> {
    name: &'a str,
    description: &'a str,
    topic_policy_config: TopicPolicyConfig<'a>,
    content_policy_config: ContentPolicyConfig,
    word_policy_config: WordPolicyConfig<'a>,
    sensitive_information_policy_config: SensitiveInformationPolicyConfig,
    blocked_input_messaging: &'a str,
    blocked_outputs_messaging: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicPolicyConfig<'a> {
    topics_config: Vec<TopicConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct TopicConfig<'a> {
    name: &'a str,
    definition: &'a str,
    examples: &'a [String],
    #[serde(rename = "type")]
    topic_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentPolicyConfig {
    filters_config: Vec<FilterConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterConfig {
    #[serde(rename = "type")]
    category: FilterCategory,
    input_strength: FilterStrength,
    output_strength: FilterStrength,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WordPolicyConfig<'a> {
    words_config: Vec<WordConfig<'a>>,
    managed_word_lists_config: Vec<ManagedWordsConfig>,
}

#[derive(Debug, Serialize)]
struct WordConfig<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ManagedWordsConfig {
    #[serde(rename = "type")]
    list: ManagedWordList,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SensitiveInformationPolicyConfig {
    pii_entities_config: Vec<PiiEntityConfig>,
}

#[derive(Debug, Serialize)]
struct PiiEntityConfig {
    #[serde(rename = "type")]
    entity: PiiEntity,
    action: PiiAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGuardrailResponse {
    guardrail_id: String,
    #[serde(default)]
    guardrail_arn: Option<String>,
    version: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a GuardrailPolicy> for CreateGuardrailRequest<'a> {
    fn from(policy: &'a GuardrailPolicy) -> Self {
        Self {
            name: &policy.name,
            description: &policy.description,
            topic_policy_config: TopicPolicyConfig {
                topics_config: policy
                    .denied_topics
                    .iter()
                    .map(|topic| TopicConfig {
                        name: &topic.name,
                        definition: &topic.definition,
                        examples: &topic.examples,
                        topic_type: "DENY",
                    })
                    .collect(),
            },
            content_policy_config: ContentPolicyConfig {
                filters_config: policy
                    .content_filters
                    .iter()
                    .map(|filter| FilterConfig {
                        category: filter.category,
                        input_strength: filter.input_strength,
                        output_strength: filter.output_strength,
                    })
                    .collect(),
            },
            word_policy_config: WordPolicyConfig {
                words_config: policy
                    .blocked_words
                    .iter()
                    .map(|text| WordConfig { text })
                    .collect(),
                managed_word_lists_config: policy
                    .managed_word_lists
                    .iter()
                    .map(|list| ManagedWordsConfig { list: *list })
                    .collect(),
            },
            sensitive_information_policy_config: SensitiveInformationPolicyConfig {
                pii_entities_config: policy
                    .pii_rules
                    .iter()
                    .map(|rule| PiiEntityConfig {
                        entity: rule.entity,
                        action: rule.action,
                    })
                    .collect(),
            },
            blocked_input_messaging: &policy.blocked_input_message,
            blocked_outputs_messaging: &policy.blocked_output_message,
        }
    }
}

/// Bedrock control-plane implementation of [`PolicyService`].
pub struct BedrockPolicyClient {
    http: BedrockHttpClient,
}

impl BedrockPolicyClient {
    pub fn new(http: BedrockHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PolicyService for BedrockPolicyClient {
    async fn create_policy(&self, policy: &GuardrailPolicy) -> Result<CreatedGuardrail> {
        tracing::debug!("Creating guardrail {}", policy.name);

        let request = CreateGuardrailRequest::from(policy);
        let response: CreateGuardrailResponse = self.http.create_guardrail(&request).await?;

        Ok(CreatedGuardrail {
            id: response.guardrail_id,
            arn: response.guardrail_arn,
            version: response.version,
            created_at: response.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guardrail::policy::retail_policy;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> BedrockPolicyClient {
        BedrockPolicyClient::new(
            BedrockHttpClient::new("test-key".to_string(), "us-east-1", Duration::from_secs(5))
                .with_endpoints(server.uri(), server.uri()),
        )
    }

    #[test]
    fn test_request_wire_format() {
        let mut policy = retail_policy();
        policy.name = "retail-chatbot-guardrail-abcd".to_string();

        let json = serde_json::to_value(CreateGuardrailRequest::from(&policy)).unwrap();

        assert_eq!(json["name"], "retail-chatbot-guardrail-abcd");
        assert_eq!(
            json["topicPolicyConfig"]["topicsConfig"][0],
            serde_json::json!({
                "name": "Finance",
                "definition": "Statements or questions about finances, transactions or monetary advise.",
                "examples": [
                    "What are the cheapest rates?",
                    "Where can I invest to get rich?",
                    "I want a refund!"
                ],
                "type": "DENY"
            })
        );
        assert_eq!(
            json["contentPolicyConfig"]["filtersConfig"][5],
            serde_json::json!({
                "type": "PROMPT_ATTACK",
                "inputStrength": "HIGH",
                "outputStrength": "NONE"
            })
        );
        assert_eq!(
            json["wordPolicyConfig"],
            serde_json::json!({
                "wordsConfig": [{ "text": "SeaScanner" }, { "text": "Megatravel Deals" }],
                "managedWordListsConfig": [{ "type": "PROFANITY" }]
            })
        );
        assert_eq!(
            json["sensitiveInformationPolicyConfig"],
            serde_json::json!({
                "piiEntitiesConfig": [{ "type": "AGE", "action": "ANONYMIZE" }]
            })
        );
        assert_eq!(json["blockedInputMessaging"], policy.blocked_input_message);
        assert_eq!(json["blockedOutputsMessaging"], policy.blocked_output_message);
    }

    #[tokio::test]
    async fn test_create_policy_returns_guardrail_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/guardrails"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "description": "Only respond to the retail product questions"
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "guardrailId": "abc123xyz",
                "guardrailArn": "arn:aws:bedrock:us-east-1:123456789012:guardrail/abc123xyz",
                "version": "DRAFT",
                "createdAt": "2024-05-01T12:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = make_client(&server)
            .create_policy(&retail_policy())
            .await
            .unwrap();

        assert_eq!(created.id, "abc123xyz");
        assert_eq!(created.version, "DRAFT");
        assert!(created.arn.unwrap().ends_with("guardrail/abc123xyz"));
        assert_eq!(
            created.created_at.unwrap().to_rfc3339(),
            "2024-05-01T12:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn test_create_policy_propagates_service_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/guardrails"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("ConflictException: name exists"),
            )
            .mount(&server)
            .await;

        let err = make_client(&server)
            .create_policy(&retail_policy())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_create_policy_requires_guardrail_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "version": "DRAFT"
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .create_policy(&retail_policy())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
