//! Guardrail policy integration
//!
//! Creates the content-policy guardrail once per process and hands out
//! the handle that guarded model calls attach.

pub mod client;
pub mod mock;
pub mod policy;
pub mod registry;

pub use client::BedrockPolicyClient;
pub use mock::MockPolicyService;
pub use policy::{retail_policy, GuardrailPolicy};
pub use registry::GuardrailRegistry;

use crate::models::BlockedStage;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Identifier and version sent with a guarded `InvokeModel` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailAttachment {
    pub identifier: String,
    pub version: String,
}

/// What the policy service returns after creating a guardrail.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedGuardrail {
    pub id: String,
    pub arn: Option<String>,
    pub version: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A guardrail ready to be attached to requests.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardrailHandle {
    pub id: String,
    /// Version attached to invocations (`DRAFT` unless configured otherwise).
    pub version: String,
    pub arn: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub blocked_input_message: String,
    pub blocked_output_message: String,
}

impl GuardrailHandle {
    pub fn attachment(&self) -> GuardrailAttachment {
        GuardrailAttachment {
            identifier: self.id.clone(),
            version: self.version.clone(),
        }
    }

    pub fn blocked_message(&self, stage: BlockedStage) -> &str {
        match stage {
            BlockedStage::Input => &self.blocked_input_message,
            BlockedStage::Output => &self.blocked_output_message,
        }
    }
}

#[async_trait]
pub trait PolicyService: Send + Sync {
    async fn create_policy(&self, policy: &GuardrailPolicy) -> Result<CreatedGuardrail>;
}
