// Gateway module for the bot core - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod commands;
mod dispatcher;

// Public re-exports - the ONLY way to access bot functionality
pub use commands::{
    is_command, Command, CommandRouter, EXIT_TEXT, HELP_TEXT, UNKNOWN_COMMAND_TEXT,
};
pub use dispatcher::{ConversationDispatcher, FAILURE_TEXT, TRANSLATE_USAGE_TEXT};
