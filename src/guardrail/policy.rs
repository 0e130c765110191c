//! Guardrail policy definition and the static retail configuration.

use crate::prompts;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct DeniedTopic {
    pub name: String,
    pub definition: String,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterCategory {
    Sexual,
    Violence,
    Hate,
    Insults,
    Misconduct,
    PromptAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterStrength {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentFilter {
    pub category: FilterCategory,
    pub input_strength: FilterStrength,
    pub output_strength: FilterStrength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagedWordList {
    Profanity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiEntity {
    Age,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiAction {
    Anonymize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiiRule {
    pub entity: PiiEntity,
    pub action: PiiAction,
}

/// Everything the policy service needs to create a guardrail.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardrailPolicy {
    pub name: String,
    pub description: String,
    pub denied_topics: Vec<DeniedTopic>,
    pub content_filters: Vec<ContentFilter>,
    pub blocked_words: Vec<String>,
    pub managed_word_lists: Vec<ManagedWordList>,
    pub pii_rules: Vec<PiiRule>,
    pub blocked_input_message: String,
    pub blocked_output_message: String,
}

fn topic(name: &str, definition: &str, examples: &[&str]) -> DeniedTopic {
    DeniedTopic {
        name: name.to_string(),
        definition: definition.to_string(),
        examples: examples.iter().map(|e| e.to_string()).collect(),
    }
}

fn high(category: FilterCategory) -> ContentFilter {
    ContentFilter {
        category,
        input_strength: FilterStrength::High,
        output_strength: FilterStrength::High,
    }
}

/// Policy for the sports retail assistant: stay on products, keep out of
/// finance and politics, never mention competitors.
///
/// Guardrail names must be unique per account, so the name carries a short
/// random suffix.
pub fn retail_policy() -> GuardrailPolicy {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string()[..4].to_string();

    GuardrailPolicy {
        name: format!("retail-chatbot-guardrail-{}", suffix),
        description: prompts::RETAIL_GUARDRAIL_DESCRIPTION.to_string(),
        denied_topics: vec![
            topic(
                "Finance",
                "Statements or questions about finances, transactions or monetary advise.",
                &[
                    "What are the cheapest rates?",
                    "Where can I invest to get rich?",
                    "I want a refund!",
                ],
            ),
            topic(
                "Politics",
                "Statements or questions about politics or politicians",
                &[
                    "What is the political situation in that country?",
                    "Give me a list of destinations governed by the greens",
                ],
            ),
        ],
        content_filters: vec![
            high(FilterCategory::Sexual),
            high(FilterCategory::Violence),
            high(FilterCategory::Hate),
            high(FilterCategory::Insults),
            high(FilterCategory::Misconduct),
            // Prompt-attack filtering only applies to input.
            ContentFilter {
                category: FilterCategory::PromptAttack,
                input_strength: FilterStrength::High,
                output_strength: FilterStrength::None,
            },
        ],
        blocked_words: vec!["SeaScanner".to_string(), "Megatravel Deals".to_string()],
        managed_word_lists: vec![ManagedWordList::Profanity],
        pii_rules: vec![PiiRule {
            entity: PiiEntity::Age,
            action: PiiAction::Anonymize,
        }],
        blocked_input_message: prompts::RETAIL_BLOCKED_MESSAGE.to_string(),
        blocked_output_message: prompts::RETAIL_BLOCKED_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retail_policy_name_has_short_suffix() {
        let policy = retail_policy();
        let suffix = policy
            .name
            .strip_prefix("retail-chatbot-guardrail-")
            .unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_retail_policy_denies_finance_and_politics() {
        let policy = retail_policy();
        let names: Vec<&str> = policy
            .denied_topics
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Finance", "Politics"]);
        assert!(policy.denied_topics.iter().all(|t| !t.examples.is_empty()));
    }

    #[test]
    fn test_prompt_attack_filters_input_only() {
        let policy = retail_policy();
        let attack = policy
            .content_filters
            .iter()
            .find(|f| f.category == FilterCategory::PromptAttack)
            .unwrap();
        assert_eq!(attack.input_strength, FilterStrength::High);
        assert_eq!(attack.output_strength, FilterStrength::None);
        assert_eq!(policy.content_filters.len(), 6);
    }

    #[test]
    fn test_retail_policy_words_and_pii() {
        let policy = retail_policy();
        assert_eq!(policy.blocked_words, vec!["SeaScanner", "Megatravel Deals"]);
        assert_eq!(policy.managed_word_lists, vec![ManagedWordList::Profanity]);
        assert_eq!(
            policy.pii_rules,
            vec![PiiRule {
                entity: PiiEntity::Age,
                action: PiiAction::Anonymize,
            }]
        );
        assert_eq!(policy.blocked_input_message, prompts::RETAIL_BLOCKED_MESSAGE);
        assert_eq!(policy.blocked_output_message, prompts::RETAIL_BLOCKED_MESSAGE);
    }
}
