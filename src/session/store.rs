//! In-memory session registry

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;
use uuid::Uuid;

use super::EditingSession;

pub type SharedSession = Arc<Mutex<EditingSession>>;

/// Sessions keyed by id. Each session sits behind its own mutex, which callers
/// must release before awaiting.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, SharedSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> SharedSession {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(EditingSession::new(id)));
        self.sessions.insert(id, session.clone());
        info!(session_id = %id, "Session created");
        session
    }

    /// Look up a session and mark it active
    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let session = self.sessions.get(id).map(|entry| entry.value().clone())?;
        session.lock().touch();
        Some(session)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop sessions idle for longer than `ttl`, returning how many went
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.lock().last_active().elapsed() < ttl);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_remove() {
        let store = SessionStore::new();
        let id = store.create().lock().id;

        assert_eq!(store.len(), 1);
        assert!(store.get(&id).is_some());
        assert!(store.get(&Uuid::new_v4()).is_none());

        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_evict_idle() {
        let store = SessionStore::new();
        store.create();
        store.create();

        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.evict_idle(Duration::ZERO), 2);
        assert!(store.is_empty());
    }
}
