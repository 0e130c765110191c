//! Fixed prompt framing and user-facing copy.

/// Anthropic messages API version accepted by Bedrock.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

pub const APP_TITLE: &str = "Welcome to XYZ Sports Depot";
pub const APP_INTRO: &str =
    "Ask me about our sports products. I can also make recommendations. Let's chat.";

pub const RETAIL_GUARDRAIL_DESCRIPTION: &str = "Only respond to the retail product questions";
pub const RETAIL_BLOCKED_MESSAGE: &str = "Sorry, I cannot respond to this. I can recommend you sports related products and answer your questions about these.";

/// Wrap a prompt in the Mistral instruction tags.
pub fn mistral_instruction(prompt: &str) -> String {
    format!("<s>[INST] {} [/INST]", prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mistral_instruction_framing() {
        assert_eq!(mistral_instruction("Hello"), "<s>[INST] Hello [/INST]");
    }

    #[test]
    fn test_copy_is_non_empty() {
        assert!(!APP_TITLE.is_empty());
        assert!(!APP_INTRO.is_empty());
        assert!(!RETAIL_GUARDRAIL_DESCRIPTION.is_empty());
        assert!(!RETAIL_BLOCKED_MESSAGE.is_empty());
    }
}
