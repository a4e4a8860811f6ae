//! Session storage.
//!
//! The plugin never creates or destroys sessions; it reads snapshots and
//! applies field updates through a [`SessionStore`] owned by the host.

use crate::types::{SenderId, Session};
use dashmap::DashMap;
use tracing::debug;

/// Per-sender session access.
///
/// Implementations must give each sender exclusive access during
/// [`SessionStore::update`], either because the host dispatches serially or
/// because the store synchronizes internally.
pub trait SessionStore: Send + Sync {
    /// Snapshot of a sender's session, `None` if the host has no session open.
    fn session(&self, id: SenderId) -> Option<Session>;

    /// Applies `apply` to an open session. Returns `false` if none is open.
    fn update(&self, id: SenderId, apply: &mut dyn FnMut(&mut Session)) -> bool;

    fn is_muted(&self, id: SenderId) -> bool {
        self.session(id).map(|s| s.muted).unwrap_or(false)
    }

    fn idle_status(&self, id: SenderId) -> Option<String> {
        self.session(id).and_then(|s| s.idle_status)
    }
}

/// In-memory store with per-entry locking.
///
/// Broadcasts never touch this store, so they never wait on private-message
/// bookkeeping for unrelated senders.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: DashMap<SenderId, Session>,
}

impl MemorySessionStore {
    /// Creates a store with the console session already open.
    pub fn new() -> Self {
        let sessions = DashMap::new();
        sessions.insert(SenderId::Console, Session::default());
        Self { sessions }
    }

    /// Opens a fresh session, typically on player join. An existing session
    /// is kept.
    pub fn open(&self, id: SenderId) {
        self.sessions.entry(id).or_default();
    }

    /// Drops a session, typically on player quit. The console session
    /// cannot be closed.
    pub fn close(&self, id: SenderId) -> Option<Session> {
        if id == SenderId::Console {
            return None;
        }
        debug!("🧹 Closing session for {}", id);
        self.sessions.remove(&id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn session(&self, id: SenderId) -> Option<Session> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    fn update(&self, id: SenderId, apply: &mut dyn FnMut(&mut Session)) -> bool {
        match self.sessions.get_mut(&id) {
            Some(mut entry) => {
                apply(entry.value_mut());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerId;

    #[test]
    fn test_console_session_is_always_open() {
        let store = MemorySessionStore::new();
        assert!(store.session(SenderId::Console).is_some());
        assert!(store.close(SenderId::Console).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_requires_open_session() {
        let store = MemorySessionStore::new();
        let player = SenderId::Player(PlayerId::new());

        assert!(!store.update(player, &mut |s| s.muted = true));
        assert!(store.session(player).is_none());

        store.open(player);
        assert!(store.update(player, &mut |s| s.muted = true));
        assert!(store.is_muted(player));
    }

    #[test]
    fn test_open_keeps_existing_session() {
        let store = MemorySessionStore::new();
        let player = SenderId::Player(PlayerId::new());
        store.open(player);
        store.update(player, &mut |s| s.idle_status = Some("brb".to_string()));

        store.open(player);
        assert_eq!(store.idle_status(player).as_deref(), Some("brb"));
    }

    #[test]
    fn test_close_discards_state() {
        let store = MemorySessionStore::new();
        let player = SenderId::Player(PlayerId::new());
        store.open(player);
        store.update(player, &mut |s| s.muted = true);

        let closed = store.close(player);
        assert_eq!(closed.map(|s| s.muted), Some(true));
        assert!(!store.is_muted(player));

        store.open(player);
        assert!(!store.is_muted(player));
    }
}
