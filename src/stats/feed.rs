use std::sync::Arc;
use std::time::Duration;

use crate::session::{SessionStore, StatsSnapshot};

/// Read-only view of the session store for presentation layers
#[derive(Clone)]
pub struct StatsFeed {
    store: Arc<SessionStore>,
}

impl StatsFeed {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Fresh snapshot of the store; nothing is cached between calls
    pub fn poll(&self) -> StatsSnapshot {
        self.store.snapshot()
    }

    /// Poll on a fixed interval and hand every snapshot to `callback`.
    /// The first snapshot is delivered immediately.
    pub fn spawn(
        &self,
        interval: Duration,
        callback: impl Fn(StatsSnapshot) + Send + 'static,
    ) -> tokio::task::JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);

            loop {
                interval.tick().await;
                callback(feed.poll());
            }
        })
    }
}
