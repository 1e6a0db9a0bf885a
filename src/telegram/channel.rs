use anyhow::{Context as _, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::routing::{handle_event, InboundEvent};
use super::types::{ApiResponse, Update, User};
use crate::bot::ConversationDispatcher;
use crate::constants::{TELEGRAM_MAX_MESSAGE_LEN, TELEGRAM_RETRY_DELAY_SECS};
use crate::utils::RelayError;

/// Telegram Bot API transport using long polling
pub struct TelegramChannel {
    client: Client,
    api_base: String,
    bot_token: String,
    allowed_users: Vec<String>,
    poll_timeout_secs: u64,
}

impl TelegramChannel {
    pub fn new(
        api_base: &str,
        bot_token: String,
        allowed_users: Vec<String>,
        poll_timeout_secs: u64,
    ) -> Result<Self> {
        // The HTTP timeout has to outlast the long-poll window
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token,
            allowed_users,
            poll_timeout_secs,
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    fn is_user_allowed(&self, identity: &str) -> bool {
        self.allowed_users.iter().any(|u| u == "*" || u == identity)
    }

    fn is_any_user_allowed<'a, I>(&self, identities: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        identities.into_iter().any(|id| self.is_user_allowed(id))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .map_err(RelayError::from)?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Malformed Telegram response to {}", method))?;

        if !envelope.ok {
            return Err(RelayError::TransportError(format!(
                "{} failed: {}",
                method,
                envelope.description.unwrap_or_default()
            ))
            .into());
        }

        envelope
            .result
            .ok_or_else(|| RelayError::TransportError(format!("{} returned no result", method)).into())
    }

    /// Verify the token; returns the bot's username
    pub async fn get_me(&self) -> Result<String> {
        let me: User = self.call("getMe", json!({})).await?;
        Ok(me.username.unwrap_or_else(|| me.id.to_string()))
    }

    /// Fetch updates after `offset`, waiting up to the poll timeout
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message"]
            }),
        )
        .await
    }

    /// Send a reply, split into chunks that fit Telegram's limit.
    /// Empty text is not sent.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in outgoing_chunks(text) {
            let _: serde_json::Value = self
                .call("sendMessage", json!({ "chat_id": chat_id, "text": chunk }))
                .await?;
        }

        Ok(())
    }

    /// Long-poll for updates forever, handling each message on its own task
    pub async fn run(self: Arc<Self>, dispatcher: Arc<ConversationDispatcher>) -> Result<()> {
        let mut offset: i64 = 0;

        tracing::info!("Telegram channel listening for messages...");

        loop {
            let updates = match self.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("Telegram poll error: {:#}", e);
                    tokio::time::sleep(Duration::from_secs(TELEGRAM_RETRY_DELAY_SECS)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.message else {
                    continue;
                };

                let event = match InboundEvent::from_message(&message) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(update_id = update.update_id, "Dropping update: {}", e);
                        continue;
                    }
                };

                let user_id = event.user.to_string();
                if !self.is_any_user_allowed([event.display_name.as_str(), user_id.as_str()]) {
                    tracing::warn!(
                        "Telegram: ignoring message from unauthorized user: {}",
                        event.display_name
                    );
                    continue;
                }

                tracing::info!(
                    user_id = %event.user,
                    chat_id = event.chat_id,
                    text_len = event.text.len(),
                    "Message received"
                );

                let channel = self.clone();
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let reply = handle_event(&dispatcher, &event).await;
                    if let Err(e) = channel.send_text(event.chat_id, &reply).await {
                        tracing::error!(
                            user_id = %event.user,
                            chat_id = event.chat_id,
                            "Failed to send reply: {:#}",
                            e
                        );
                    }
                });
            }
        }
    }
}

/// Chunks to send for one reply; blank replies produce none
fn outgoing_chunks(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    split_message(text, TELEGRAM_MAX_MESSAGE_LEN)
}

/// Split a message into chunks that fit within Telegram's limit.
///
/// Prefers paragraph, line, sentence and word boundaries, and never cuts
/// inside a UTF-8 character.
fn split_message(message: &str, max_len: usize) -> Vec<String> {
    if message.len() <= max_len {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = message;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let mut boundary = max_len;
        while !remaining.is_char_boundary(boundary) {
            boundary -= 1;
        }

        let chunk = &remaining[..boundary];
        let split_pos = chunk
            .rfind("\n\n")
            .or_else(|| chunk.rfind('\n'))
            .or_else(|| chunk.rfind(". ").map(|pos| pos + 1))
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(boundary);

        let actual_split = if split_pos == 0 { boundary } else { split_pos };

        chunks.push(remaining[..actual_split].to_string());
        remaining = remaining[actual_split..].trim_start();
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(allowed: &[&str]) -> TelegramChannel {
        TelegramChannel::new(
            "https://api.telegram.org/",
            "123:ABC".to_string(),
            allowed.iter().map(|s| s.to_string()).collect(),
            30,
        )
        .unwrap()
    }

    #[test]
    fn telegram_api_url() {
        assert_eq!(
            channel(&[]).api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    #[test]
    fn telegram_user_allowed_wildcard() {
        assert!(channel(&["*"]).is_user_allowed("anyone"));
    }

    #[test]
    fn telegram_user_allowed_specific() {
        let ch = channel(&["alice", "42"]);
        assert!(ch.is_any_user_allowed(["bob", "42"]));
        assert!(ch.is_user_allowed("alice"));
        assert!(!ch.is_any_user_allowed(["eve", "7"]));
    }

    #[test]
    fn split_message_short() {
        let result = split_message("Hello, World!", 4096);
        assert_eq!(result, vec!["Hello, World!".to_string()]);
    }

    #[test]
    fn split_message_long() {
        let msg = "x".repeat(5000);
        let result = split_message(&msg, 4096);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].len(), 4096);
    }

    #[test]
    fn split_message_prefers_newlines() {
        let msg = format!("{}\n{}", "a".repeat(10), "b".repeat(10));
        let result = split_message(&msg, 15);
        assert_eq!(result, vec!["a".repeat(10), "b".repeat(10)]);
    }

    #[test]
    fn split_message_keeps_period_with_sentence() {
        let result = split_message("aaaaaaaaaa. bbbbbbbbbb", 15);
        assert_eq!(result, vec!["aaaaaaaaaa.".to_string(), "bbbbbbbbbb".to_string()]);
    }

    #[test]
    fn outgoing_chunks_skip_blank_replies() {
        assert!(outgoing_chunks("").is_empty());
        assert!(outgoing_chunks("  \n\t ").is_empty());
        assert_eq!(outgoing_chunks("ok"), vec!["ok".to_string()]);
        assert_eq!(outgoing_chunks(&"x".repeat(5000)).len(), 2);
    }

    #[tokio::test]
    async fn send_text_with_blank_reply_makes_no_request() {
        // Nothing listens on this address, so any request would fail
        let ch = TelegramChannel::new("http://127.0.0.1:9", "123:ABC".to_string(), vec![], 1).unwrap();
        assert!(ch.send_text(42, "").await.is_ok());
        assert!(ch.send_text(42, "   ").await.is_ok());
    }

    #[test]
    fn split_message_respects_char_boundaries() {
        let msg = "я".repeat(3000); // 2 bytes each
        let result = split_message(&msg, 4095);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|c| c.len() <= 4095));
        assert_eq!(result.concat(), msg);
    }

    #[test]
    fn parse_updates_response() {
        let raw = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {"message_id": 1, "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"}, "chat": {"id": 42, "type": "private"}, "date": 0, "text": "hello"}},
                {"update_id": 11, "edited_message": {}}
            ]
        }"#;
        let parsed: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = parsed.result.unwrap();

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("hello"));
        assert!(updates[1].message.is_none());
    }
}
