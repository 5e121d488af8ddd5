//! In-memory owner of live hearing sessions. Sessions are never persisted;
//! each is discarded once its prompt has been sent or once it sits idle
//! longer than the store's TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::session::HearingSession;
use super::HearingError;

/// Idle time after which an abandoned session is reclaimed.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    session: HearingSession,
    last_touched: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Stores a new session, reclaiming idle ones first.
    pub async fn insert(&self, session: HearingSession) {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        prune(&mut sessions, now, self.ttl);

        debug!(session_id = %session.id, "Hearing session created");
        sessions.insert(
            session.id,
            Entry {
                session,
                last_touched: now,
            },
        );
    }

    pub async fn get(&self, id: Uuid) -> Option<HearingSession> {
        let mut sessions = self.sessions.write().await;
        let entry = self.live_entry(&mut sessions, id)?;
        entry.last_touched = Instant::now();
        Some(entry.session.clone())
    }

    /// Runs `f` against one session under the write lock and returns the
    /// session snapshot alongside `f`'s output. `None` if the id is unknown
    /// or the session has expired.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut HearingSession) -> Result<T, HearingError>,
    ) -> Option<Result<(T, HearingSession), HearingError>> {
        let mut sessions = self.sessions.write().await;
        let entry = self.live_entry(&mut sessions, id)?;
        entry.last_touched = Instant::now();
        Some(f(&mut entry.session).map(|out| (out, entry.session.clone())))
    }

    pub async fn remove(&self, id: Uuid) -> Option<HearingSession> {
        let removed = self.sessions.write().await.remove(&id);
        if removed.is_some() {
            debug!(session_id = %id, "Hearing session discarded");
        }
        removed.map(|entry| entry.session)
    }

    /// Drops every session idle longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        prune(&mut sessions, Instant::now(), self.ttl)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, Entry>,
        id: Uuid,
    ) -> Option<&'a mut Entry> {
        let expired = sessions
            .get(&id)
            .is_some_and(|e| e.last_touched.elapsed() > self.ttl);
        if expired {
            sessions.remove(&id);
            debug!(session_id = %id, "Hearing session expired");
            return None;
        }
        sessions.get_mut(&id)
    }
}

fn prune(sessions: &mut HashMap<Uuid, Entry>, now: Instant, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, e| now.duration_since(e.last_touched) <= ttl);
    let evicted = before - sessions.len();
    if evicted > 0 {
        info!("Evicted {evicted} idle hearing session(s)");
    }
    evicted
}

/// Periodically reclaims idle sessions for the life of the process.
pub fn spawn_eviction(store: SessionStore, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            store.evict_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hearing::StepCatalog;

    #[tokio::test]
    async fn test_update_mutates_stored_session() {
        let catalog = StepCatalog::travel().unwrap();
        let store = SessionStore::default();
        let session = HearingSession::new(&catalog);
        let id = session.id;
        store.insert(session).await;

        let (next, snapshot) = store
            .update(id, |s| s.select(&catalog, "new_plan"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next, "budget");
        assert_eq!(snapshot.current_step_id, "budget");
        assert_eq!(store.get(id).await.unwrap().current_step_id, "budget");
    }

    #[tokio::test]
    async fn test_failed_update_leaves_session_unchanged() {
        let catalog = StepCatalog::travel().unwrap();
        let store = SessionStore::default();
        let session = HearingSession::new(&catalog);
        let id = session.id;
        store.insert(session).await;

        let result = store.update(id, |s| s.skip(&catalog)).await.unwrap();
        assert!(result.is_err());
        assert_eq!(store.get(id).await.unwrap().current_step_id, "welcome");
    }

    #[tokio::test]
    async fn test_unknown_id_and_remove() {
        let catalog = StepCatalog::travel().unwrap();
        let store = SessionStore::default();
        assert!(store.update(Uuid::new_v4(), |_| Ok(())).await.is_none());

        let session = HearingSession::new(&catalog);
        let id = session.id;
        store.insert(session).await;
        assert_eq!(store.len().await, 1);
        assert!(store.remove(id).await.is_some());
        assert!(store.remove(id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let catalog = StepCatalog::travel().unwrap();
        let store = SessionStore::with_ttl(Duration::from_secs(60));

        let stale = HearingSession::new(&catalog);
        let stale_id = stale.id;
        store.insert(stale).await;
        let active = HearingSession::new(&catalog);
        let active_id = active.id;
        store.insert(active).await;

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(store.get(active_id).await.is_some());
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(store.evict_idle().await, 1);
        assert!(store.get(stale_id).await.is_none());
        assert!(store.get(active_id).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_reclaims_abandoned_sessions() {
        let catalog = StepCatalog::travel().unwrap();
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        for _ in 0..5 {
            store.insert(HearingSession::new(&catalog)).await;
        }

        tokio::time::advance(Duration::from_secs(61)).await;
        store.insert(HearingSession::new(&catalog)).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_is_gone_on_access() {
        let catalog = StepCatalog::travel().unwrap();
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        let session = HearingSession::new(&catalog);
        let id = session.id;
        store.insert(session).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.update(id, |s| s.select(&catalog, "new_plan")).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_evicts() {
        let catalog = StepCatalog::travel().unwrap();
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        store.insert(HearingSession::new(&catalog)).await;

        let sweeper = spawn_eviction(store.clone(), Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(store.len().await, 0);
        sweeper.abort();
    }
}
