use super::{CreatedGuardrail, GuardrailPolicy, PolicyService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory [`PolicyService`] counting creation calls.
#[derive(Clone)]
pub struct MockPolicyService {
    guardrail_id: String,
    delay: Option<Duration>,
    failures_left: Arc<Mutex<usize>>,
    call_count: Arc<Mutex<usize>>,
    created: Arc<Mutex<Vec<GuardrailPolicy>>>,
}

impl MockPolicyService {
    pub fn new() -> Self {
        Self {
            guardrail_id: "mock-guardrail".to_string(),
            delay: None,
            failures_left: Arc::new(Mutex::new(0)),
            call_count: Arc::new(Mutex::new(0)),
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_guardrail_id(mut self, id: String) -> Self {
        self.guardrail_id = id;
        self
    }

    /// Sleep inside each creation call, widening the first-use race window.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the next `count` creation calls with a 503.
    pub fn with_failures(self, count: usize) -> Self {
        *self.failures_left.lock().unwrap() = count;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_created(&self) -> Vec<GuardrailPolicy> {
        self.created.lock().unwrap().clone()
    }
}

impl Default for MockPolicyService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyService for MockPolicyService {
    async fn create_policy(&self, policy: &GuardrailPolicy) -> Result<CreatedGuardrail> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::Api {
                    status: 503,
                    message: "ServiceUnavailableException".to_string(),
                });
            }
        }

        self.created.lock().unwrap().push(policy.clone());
        Ok(CreatedGuardrail {
            id: self.guardrail_id.clone(),
            arn: None,
            version: "DRAFT".to_string(),
            created_at: None,
        })
    }
}
