use super::{GuardrailHandle, GuardrailPolicy, PolicyService};
use crate::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Creates the guardrail on first use and reuses its handle afterwards.
///
/// Concurrent first callers share a single creation. A failed creation
/// leaves the cache empty.
pub struct GuardrailRegistry {
    service: Box<dyn PolicyService>,
    policy: GuardrailPolicy,
    version: String,
    handle: OnceCell<Arc<GuardrailHandle>>,
}

impl GuardrailRegistry {
    pub fn new(service: Box<dyn PolicyService>, policy: GuardrailPolicy, version: String) -> Self {
        Self {
            service,
            policy,
            version,
            handle: OnceCell::new(),
        }
    }

    /// Start with an already-created guardrail so nothing is created remotely.
    pub fn with_existing(
        service: Box<dyn PolicyService>,
        policy: GuardrailPolicy,
        id: String,
        version: String,
    ) -> Self {
        let handle = GuardrailHandle {
            id,
            version: version.clone(),
            arn: None,
            created_at: None,
            blocked_input_message: policy.blocked_input_message.clone(),
            blocked_output_message: policy.blocked_output_message.clone(),
        };

        Self {
            service,
            policy,
            version,
            handle: OnceCell::from(Arc::new(handle)),
        }
    }

    pub fn policy(&self) -> &GuardrailPolicy {
        &self.policy
    }

    /// The cached handle, if the guardrail has been created.
    pub fn cached(&self) -> Option<Arc<GuardrailHandle>> {
        self.handle.get().cloned()
    }

    pub async fn ensure_policy(&self) -> Result<Arc<GuardrailHandle>> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let created = self.service.create_policy(&self.policy).await?;
                info!(
                    "Created guardrail {} (id: {}, version: {})",
                    self.policy.name, created.id, created.version
                );

                Ok::<_, crate::Error>(Arc::new(GuardrailHandle {
                    id: created.id,
                    version: self.version.clone(),
                    arn: created.arn,
                    created_at: created.created_at,
                    blocked_input_message: self.policy.blocked_input_message.clone(),
                    blocked_output_message: self.policy.blocked_output_message.clone(),
                }))
            })
            .await?;

        Ok(Arc::clone(handle))
    }
}
