use std::sync::Arc;
use tracing::{debug, error, info};

use super::commands::{is_command, CommandRouter};
use crate::models::{Model, ModelConfig};
use crate::session::{SessionStore, UserId};

pub const FAILURE_TEXT: &str =
    "Sorry, I couldn't get a reply from the model right now. Please try again later.";

pub const TRANSLATE_USAGE_TEXT: &str = "Usage: /translate <text>";

const TRANSLATE_INSTRUCTION: &str = "Translate into English: ";

/// Entry point for every inbound text event
pub struct ConversationDispatcher {
    store: Arc<SessionStore>,
    router: CommandRouter,
    model: Arc<dyn Model>,
    model_config: ModelConfig,
}

impl ConversationDispatcher {
    pub fn new(store: Arc<SessionStore>, model: Arc<dyn Model>, model_config: ModelConfig) -> Self {
        Self {
            router: CommandRouter::new(store.clone()),
            store,
            model,
            model_config,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Handle one inbound message and produce the reply text.
    ///
    /// Commands go to the router and leave the counters alone. Anything else
    /// is a model turn; its counters move only when the model answered.
    pub async fn handle_incoming(&self, user: UserId, display_name: &str, text: &str) -> String {
        if is_command(text) {
            return self.router.route(text, user, display_name);
        }

        let turn = self.store.turn_lock(user);
        let _turn = turn.lock().await;

        let session = self.store.get_or_create(user);
        debug!(
            user_id = %user,
            history = session.conversation.len(),
            "Forwarding message to model"
        );

        match self
            .model
            .chat(&session.conversation, text, &self.model_config)
            .await
        {
            Ok(response) => {
                self.store
                    .commit_exchange(user, display_name, response.conversation);
                info!(
                    user_id = %user,
                    display_name,
                    model = %response.model_name,
                    reply_len = response.content.len(),
                    total_tokens = response.usage.as_ref().map(|u| u.total_tokens),
                    "Model replied"
                );
                if let Some(usage) = &response.usage {
                    debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Token usage"
                    );
                }
                response.content
            }
            Err(e) => {
                error!(user_id = %user, error = %format!("{:#}", e), "Model call failed");
                FAILURE_TEXT.to_string()
            }
        }
    }

    /// Ask the model to translate `text` into English within the user's
    /// conversation. Counters and the active-users view are left untouched.
    pub async fn handle_translate(&self, user: UserId, text: &str) -> String {
        let turn = self.store.turn_lock(user);
        let _turn = turn.lock().await;

        let session = self.store.get_or_create(user);

        let text = text.trim();
        if text.is_empty() {
            return TRANSLATE_USAGE_TEXT.to_string();
        }

        let prompt = format!("{}{}", TRANSLATE_INSTRUCTION, text);
        match self
            .model
            .chat(&session.conversation, &prompt, &self.model_config)
            .await
        {
            Ok(response) => {
                self.store.store_conversation(user, response.conversation);
                response.content
            }
            Err(e) => {
                error!(user_id = %user, error = %format!("{:#}", e), "Translation failed");
                FAILURE_TEXT.to_string()
            }
        }
    }
}
