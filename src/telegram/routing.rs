use super::types::Message;
use crate::bot::ConversationDispatcher;
use crate::constants::COMMAND_PREFIX;
use crate::session::UserId;
use crate::utils::RelayError;

pub const GREETING_TEXT: &str =
    "Hi! I'm a chat bot backed by a Gemini model. Send me a message or use the commands.";

/// One text message from a chat participant
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user: UserId,
    pub chat_id: i64,
    pub display_name: String,
    pub text: String,
}

impl InboundEvent {
    /// Extract the event from a Telegram message; messages without a sender
    /// or without text are malformed for this bot
    pub fn from_message(message: &Message) -> Result<Self, RelayError> {
        let from = message.from.as_ref().ok_or_else(|| {
            RelayError::MalformedEvent(format!("message {} has no sender", message.message_id))
        })?;
        let text = message.text.as_ref().ok_or_else(|| {
            RelayError::MalformedEvent(format!("message {} has no text", message.message_id))
        })?;

        let display_name = from
            .username
            .clone()
            .or_else(|| from.first_name.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            user: UserId(from.id),
            chat_id: message.chat.id,
            display_name,
            text: text.clone(),
        })
    }
}

/// Split a slash-command into its name and argument text.
///
/// `/translate@my_bot hello there` gives `("translate", "hello there")`.
pub fn parse_command(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix(COMMAND_PREFIX)?;
    let (token, args) = match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };
    let name = token.split('@').next().unwrap_or(token);
    Some((name, args))
}

/// Produce the reply for one inbound event.
///
/// Named commands are dispatched here; every other text, unknown commands
/// included, goes through the dispatcher.
pub async fn handle_event(dispatcher: &ConversationDispatcher, event: &InboundEvent) -> String {
    match parse_command(&event.text) {
        Some(("start", _)) => GREETING_TEXT.to_string(),
        Some((name @ ("help" | "clear" | "exit"), _)) => dispatcher.router().route(
            &format!("{}{}", COMMAND_PREFIX, name),
            event.user,
            &event.display_name,
        ),
        Some(("translate", args)) => dispatcher.handle_translate(event.user, args).await,
        _ => {
            dispatcher
                .handle_incoming(event.user, &event.display_name, &event.text)
                .await
        }
    }
}
