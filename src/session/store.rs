use chrono::Local;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use super::types::{ActiveUser, Session, StatsSnapshot, UserId};
use crate::models::ConversationHandle;

struct UserEntry {
    session: Session,
    /// Serialises dialogue turns of this one user
    turn: Arc<AsyncMutex<()>>,
}

impl UserEntry {
    fn new() -> Self {
        Self {
            session: Session::new(),
            turn: Arc::new(AsyncMutex::new(())),
        }
    }
}

#[derive(Default)]
struct StoreInner {
    sessions: HashMap<UserId, UserEntry>,
    active_users: BTreeMap<UserId, ActiveUser>,
}

impl StoreInner {
    fn entry(&mut self, user: UserId) -> &mut UserEntry {
        self.sessions.entry(user).or_insert_with(|| {
            debug!(user_id = %user, "Creating session");
            UserEntry::new()
        })
    }
}

/// Process-wide store of per-user sessions and the active-users view.
///
/// Every operation runs under one short-lived lock and never across an
/// `.await`, so readers always see whole updates and no caller waits on
/// another user's model call.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<StoreInner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the user's session, created with zeroed counters if absent
    pub fn get_or_create(&self, user: UserId) -> Session {
        if let Some(entry) = self.inner.read().sessions.get(&user) {
            return entry.session.clone();
        }
        self.inner.write().entry(user).session.clone()
    }

    /// Start a fresh conversation for the user, keeping the counters
    pub fn reset(&self, user: UserId) {
        let mut inner = self.inner.write();
        inner.entry(user).session.conversation = ConversationHandle::new();
    }

    pub fn record_sent(&self, user: UserId) {
        self.inner.write().entry(user).session.sent_count += 1;
    }

    pub fn record_received(&self, user: UserId) {
        self.inner.write().entry(user).session.received_count += 1;
    }

    /// Commit a successful exchange: both counters, the active-users entry
    /// and the extended conversation change together.
    ///
    /// The conversation is only stored if the session still holds the same
    /// dialogue, so a `/clear` that lands while the model call is in flight
    /// keeps its fresh handle.
    pub fn commit_exchange(&self, user: UserId, display_name: &str, conversation: ConversationHandle) {
        let mut inner = self.inner.write();

        let session = &mut inner.entry(user).session;
        session.sent_count += 1;
        session.received_count += 1;
        if session.conversation.same_conversation(&conversation) {
            session.conversation = conversation;
        } else {
            debug!(user_id = %user, "Conversation was reset during the exchange, dropping reply history");
        }

        inner.active_users.insert(
            user,
            ActiveUser {
                display_name: display_name.to_string(),
                last_seen: Local::now(),
            },
        );
    }

    /// Store an extended conversation without touching counters or the
    /// active-users view. Same reset guard as [`SessionStore::commit_exchange`].
    pub fn store_conversation(&self, user: UserId, conversation: ConversationHandle) {
        let mut inner = self.inner.write();
        let session = &mut inner.entry(user).session;
        if session.conversation.same_conversation(&conversation) {
            session.conversation = conversation;
        }
    }

    /// Lock that orders the dialogue turns of one user
    pub fn turn_lock(&self, user: UserId) -> Arc<AsyncMutex<()>> {
        if let Some(entry) = self.inner.read().sessions.get(&user) {
            return entry.turn.clone();
        }
        self.inner.write().entry(user).turn.clone()
    }

    /// Aggregate counters and the active-users view at one point in time
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.read();

        let (total_sent, total_received) = inner
            .sessions
            .values()
            .fold((0u64, 0u64), |(sent, received), entry| {
                (sent + entry.session.sent_count, received + entry.session.received_count)
            });

        StatsSnapshot {
            total_sent,
            total_received,
            active_users: inner.active_users.clone(),
            taken_at: Local::now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, user: UserId) -> bool {
        self.inner.read().sessions.contains_key(&user)
    }

    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_user_gets_zeroed_session() {
        let store = SessionStore::new();
        let user = UserId(7);
        assert!(!store.contains(user));

        let session = store.get_or_create(user);

        assert_eq!(session.sent_count, 0);
        assert_eq!(session.received_count, 0);
        assert!(session.conversation.is_empty());
        assert!(store.contains(user));
    }

    #[test]
    fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new();
        let first = store.get_or_create(UserId(1));
        let second = store.get_or_create(UserId(1));

        assert!(first.conversation.same_conversation(&second.conversation));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reset_replaces_handle_keeps_counters() {
        let store = SessionStore::new();
        let user = UserId(3);
        store.record_sent(user);
        store.record_received(user);
        let before = store.get_or_create(user);

        store.reset(user);
        let after = store.get_or_create(user);

        assert!(!before.conversation.same_conversation(&after.conversation));
        assert_eq!(after.sent_count, 1);
        assert_eq!(after.received_count, 1);
    }

    #[test]
    fn test_record_creates_missing_session() {
        let store = SessionStore::new();
        store.record_received(UserId(9));

        let session = store.get_or_create(UserId(9));
        assert_eq!(session.sent_count, 0);
        assert_eq!(session.received_count, 1);
    }

    #[test]
    fn test_commit_exchange_updates_everything() {
        let store = SessionStore::new();
        let user = UserId(42);
        let session = store.get_or_create(user);
        let extended = session.conversation.with_exchange("hello", "hi!", None);

        store.commit_exchange(user, "alice", extended);

        let session = store.get_or_create(user);
        assert_eq!(session.sent_count, 1);
        assert_eq!(session.received_count, 1);
        assert_eq!(session.conversation.len(), 2);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.active_users[&user].display_name, "alice");
    }

    #[test]
    fn test_commit_after_reset_keeps_fresh_handle() {
        let store = SessionStore::new();
        let user = UserId(5);
        let stale = store
            .get_or_create(user)
            .conversation
            .with_exchange("q", "a", None);

        store.reset(user);
        store.commit_exchange(user, "bob", stale);

        let session = store.get_or_create(user);
        assert!(session.conversation.is_empty());
        assert_eq!(session.sent_count, 1);
        assert_eq!(session.received_count, 1);
    }

    #[test]
    fn test_store_conversation_leaves_counters_and_view() {
        let store = SessionStore::new();
        let user = UserId(11);
        let extended = store
            .get_or_create(user)
            .conversation
            .with_exchange("q", "a", None);

        store.store_conversation(user, extended);

        let session = store.get_or_create(user);
        assert_eq!(session.conversation.len(), 2);
        assert_eq!(session.sent_count, 0);
        assert!(store.snapshot().active_users.is_empty());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = SessionStore::new().snapshot();
        assert_eq!(snapshot.total_sent, 0);
        assert_eq!(snapshot.total_received, 0);
        assert!(snapshot.active_users.is_empty());
    }

    #[test]
    fn test_concurrent_get_or_create_single_winner() {
        let store = Arc::new(SessionStore::new());
        let user = UserId(100);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.get_or_create(user).conversation.id())
            })
            .collect();

        let ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_never_sees_half_an_exchange() {
        let store = Arc::new(SessionStore::new());

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let user = UserId(i % 4);
                    let conversation = store.get_or_create(user).conversation;
                    store.commit_exchange(user, "u", conversation);
                }
            })
        };

        for _ in 0..500 {
            let snapshot = store.snapshot();
            assert_eq!(snapshot.total_sent, snapshot.total_received);
        }

        writer.join().unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_sent, 500);
        assert_eq!(snapshot.active_users.len(), 4);
    }
}
