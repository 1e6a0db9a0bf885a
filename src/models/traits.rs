use anyhow::Result;
use async_trait::async_trait;

use super::conversation::ConversationHandle;
use super::types::{ModelConfig, ModelResponse};

/// Core trait that all model backends must implement
///
/// `chat` takes `&self` so that calls for different users can be in flight at
/// the same time on one shared instance.
#[async_trait]
pub trait Model: Send + Sync {
    /// Send `input` as the next turn of `conversation` and get the reply,
    /// together with the conversation extended by this exchange
    async fn chat(
        &self,
        conversation: &ConversationHandle,
        input: &str,
        config: &ModelConfig,
    ) -> Result<ModelResponse>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Validate that the model is accessible
    async fn validate_connection(&self) -> Result<bool> {
        Ok(true)
    }
}
