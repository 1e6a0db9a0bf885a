//! Scripted model used by tests across the crate.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Barrier, Notify};

use super::conversation::ConversationHandle;
use super::traits::Model;
use super::types::{ModelConfig, ModelResponse};

pub(crate) struct ScriptedModel {
    fail: bool,
    barrier: Option<Arc<Barrier>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    /// Replies with `echo: <input>`
    pub(crate) fn echo() -> Self {
        Self {
            fail: false,
            barrier: None,
            gate: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a service error
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::echo()
        }
    }

    /// Each call waits on the barrier before replying
    pub(crate) fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    /// Each call waits for a notification before replying
    pub(crate) fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Model for ScriptedModel {
    async fn chat(
        &self,
        conversation: &ConversationHandle,
        input: &str,
        config: &ModelConfig,
    ) -> Result<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(input.to_string());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.fail {
            anyhow::bail!("service unavailable");
        }

        let content = format!("echo: {}", input);
        Ok(ModelResponse {
            conversation: conversation.with_exchange(input, &content, config.max_history_messages),
            content,
            usage: None,
            model_name: "scripted".to_string(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
