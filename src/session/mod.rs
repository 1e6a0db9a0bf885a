/// Session management module - Gateway

mod store;
mod types;

pub use store::SessionStore;
pub use types::{ActiveUser, Session, StatsSnapshot, UserId};
