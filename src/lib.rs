pub mod app;
pub mod bot;
pub mod cli;
pub mod constants;
pub mod dashboard;
pub mod models;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod telegram;
pub mod utils;

pub use app::{load_config, Config};
pub use bot::{CommandRouter, ConversationDispatcher};
pub use models::{ConversationHandle, Model, ModelFactory};
pub use session::{SessionStore, StatsSnapshot, UserId};
pub use stats::StatsFeed;
pub use utils::RelayError;
