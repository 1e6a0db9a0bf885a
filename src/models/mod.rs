// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod conversation;
mod factory;
mod traits;
mod types;
mod unified;

#[cfg(test)]
pub(crate) mod fake;

// Public re-exports - the ONLY way to access model functionality
pub use conversation::ConversationHandle;
pub use factory::ModelFactory;
pub use traits::Model;
pub use types::{ChatMessage, MessageRole, ModelConfig, ModelResponse, TokenUsage};
pub use unified::UnifiedModel;
