use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::COMMAND_PREFIX;
use crate::session::{SessionStore, UserId};

pub const HELP_TEXT: &str = "Available commands:\n\
/help - show this help\n\
/clear - clear the conversation\n\
/exit - leave the program\n\
/translate <text> - translate text into English\n";

pub const EXIT_TEXT: &str = "Exiting the program.";

pub const UNKNOWN_COMMAND_TEXT: &str =
    "Unknown command. Type /help for the list of available commands.\n";

/// Commands understood by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Exit,
    Unknown,
}

impl Command {
    /// Match the first token of `text` exactly against the command vocabulary
    pub fn parse(text: &str) -> Self {
        match text.split_whitespace().next().unwrap_or("") {
            "/help" => Command::Help,
            "/clear" => Command::Clear,
            "/exit" => Command::Exit,
            _ => Command::Unknown,
        }
    }
}

/// Whether `text` is addressed to the command router
pub fn is_command(text: &str) -> bool {
    text.starts_with(COMMAND_PREFIX)
}

/// Maps slash-commands to fixed replies or session actions
#[derive(Clone)]
pub struct CommandRouter {
    store: Arc<SessionStore>,
}

impl CommandRouter {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Reply for a command. An empty reply means nothing should be sent.
    ///
    /// `/exit` only answers; the process keeps serving.
    pub fn route(&self, command_text: &str, user: UserId, display_name: &str) -> String {
        let command = Command::parse(command_text);
        debug!(user_id = %user, display_name, ?command, "Routing command");

        match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::Clear => {
                self.store.reset(user);
                info!(user_id = %user, "Conversation cleared");
                String::new()
            }
            Command::Exit => EXIT_TEXT.to_string(),
            Command::Unknown => UNKNOWN_COMMAND_TEXT.to_string(),
        }
    }
}
