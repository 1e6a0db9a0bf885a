// Gateway module for stats - follows the Train Station Pattern
// All external access must go through this gateway

mod feed;

pub use feed::StatsFeed;
