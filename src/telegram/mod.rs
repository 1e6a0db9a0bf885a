// Gateway module for the Telegram transport - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod channel;
mod routing;
mod types;

// Public re-exports - the ONLY way to access Telegram functionality
pub use channel::TelegramChannel;
pub use routing::{handle_event, parse_command, InboundEvent, GREETING_TEXT};
pub use types::{Chat, Message, Update, User};
