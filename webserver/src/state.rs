//! Webserver state management
//!
//! Maps HTTP session ids to isolated design sessions. The collaborator
//! clients are created once and shared by every session. Sessions idle past
//! the TTL are swept, and the registry never holds more than `max_sessions`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use designer::{DesignSession, DesignTextGenerator, ImageSearchProvider, SessionSettings};
use shared::{session_info, SessionId};

use crate::error::{WebServerError, WebServerResult};

pub type SharedSession<G, S> = Arc<DesignSession<G, S>>;

/// Bounds on the session registry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions untouched for this long are closed by the sweep
    pub idle_ttl: Duration,
    /// Creating a session beyond this evicts the least recently used one
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            max_sessions: 1000,
        }
    }
}

struct SessionSlot<G, S>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    session: SharedSession<G, S>,
    /// Milliseconds since server start at the last lookup
    last_seen: AtomicU64,
}

/// Core webserver state
pub struct WebServerState<G, S>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    sessions: RwLock<HashMap<SessionId, SessionSlot<G, S>>>,
    generator: Arc<G>,
    search: Arc<S>,
    settings: SessionSettings,
    limits: SessionLimits,
    server_start_time: Instant,
}

impl<G, S> WebServerState<G, S>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    pub fn new(generator: Arc<G>, search: Arc<S>, settings: SessionSettings) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            generator,
            search,
            settings,
            limits: SessionLimits::default(),
            server_start_time: Instant::now(),
        }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &SessionLimits {
        &self.limits
    }

    fn now_millis(&self) -> u64 {
        u64::try_from(self.server_start_time.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Start a fresh session with an empty form and cache
    pub async fn create_session(&self) -> SharedSession<G, S> {
        let id = SessionId::new();
        let session = Arc::new(DesignSession::new(
            id,
            self.generator.clone(),
            self.search.clone(),
            self.settings.clone(),
        ));
        let slot = SessionSlot {
            session: session.clone(),
            last_seen: AtomicU64::new(self.now_millis()),
        };

        let mut sessions = self.sessions.write().await;
        self.remove_expired(&mut sessions);
        while sessions.len() >= self.limits.max_sessions.max(1) {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_seen.load(Ordering::Relaxed))
                .map(|(id, _)| *id);
            let Some(oldest) = oldest else { break };
            if let Some(evicted) = sessions.remove(&oldest) {
                evicted.session.cancel();
                session_info!(oldest, "Session evicted, registry full");
            }
        }
        sessions.insert(id, slot);
        drop(sessions);

        session_info!(id, "Session created");
        session
    }

    /// Look up a session and mark it as recently used
    pub async fn session(&self, id: &SessionId) -> WebServerResult<SharedSession<G, S>> {
        let sessions = self.sessions.read().await;
        let slot = sessions.get(id).ok_or_else(|| WebServerError::session_not_found(id))?;
        slot.last_seen.store(self.now_millis(), Ordering::Relaxed);
        Ok(slot.session.clone())
    }

    /// Close sessions idle for longer than the TTL; returns how many were closed
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.remove_expired(&mut sessions)
    }

    fn remove_expired(&self, sessions: &mut HashMap<SessionId, SessionSlot<G, S>>) -> usize {
        let ttl = u64::try_from(self.limits.idle_ttl.as_millis()).unwrap_or(u64::MAX);
        let now = self.now_millis();
        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, slot)| now.saturating_sub(slot.last_seen.load(Ordering::Relaxed)) >= ttl)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if let Some(slot) = sessions.remove(id) {
                slot.session.cancel();
                session_info!(*id, "Session expired");
            }
        }
        expired.len()
    }

    /// Drop a session, aborting any submit it still has pending
    pub async fn close_session(&self, id: &SessionId) -> WebServerResult<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| WebServerError::session_not_found(id))?
            .session;
        session.cancel();
        session_info!(id, "Session closed");
        Ok(())
    }

    /// Close every session; returns how many were open
    pub async fn close_all(&self) -> usize {
        let sessions: Vec<_> = self.sessions.write().await.drain().collect();
        for (_, slot) in &sessions {
            slot.session.cancel();
        }
        sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn uptime(&self) -> Duration {
        self.server_start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use designer::{MockDesignTextGenerator, MockImageSearchProvider};

    fn state() -> WebServerState<MockDesignTextGenerator, MockImageSearchProvider> {
        WebServerState::new(
            Arc::new(MockDesignTextGenerator::new()),
            Arc::new(MockImageSearchProvider::new()),
            SessionSettings::default(),
        )
    }

    fn limited_state(
        idle_ttl: Duration,
        max_sessions: usize,
    ) -> WebServerState<MockDesignTextGenerator, MockImageSearchProvider> {
        state().with_limits(SessionLimits { idle_ttl, max_sessions })
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = state();
        let session = state.create_session().await;
        let id = *session.id();

        assert_eq!(state.session_count().await, 1);
        assert!(Arc::ptr_eq(&state.session(&id).await.unwrap(), &session));

        state.close_session(&id).await.unwrap();
        assert_eq!(state.session_count().await, 0);
        assert!(matches!(state.session(&id).await, Err(WebServerError::SessionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_close_all_empties_registry() {
        let state = state();
        state.create_session().await;
        state.create_session().await;

        assert_eq!(state.close_all().await, 2);
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_close_unknown_session() {
        let state = state();
        let result = state.close_session(&SessionId::new()).await;
        assert!(matches!(result, Err(WebServerError::SessionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_sessions_get_distinct_forms() {
        let state = state();
        let first = state.create_session().await;
        let second = state.create_session().await;

        first.add_room().await;

        assert_ne!(first.id(), second.id());
        assert_eq!(first.rooms().await.len(), 1);
        assert!(second.rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_closes_idle_sessions() {
        let state = limited_state(Duration::from_millis(50), 100);
        for _ in 0..3 {
            state.create_session().await;
        }
        assert_eq!(state.session_count().await, 3);
        assert_eq!(state.sweep_expired().await, 0);

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(state.sweep_expired().await, 3);
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_sweeps_expired_sessions() {
        let state = limited_state(Duration::from_millis(50), 100);
        let stale = state.create_session().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let fresh = state.create_session().await;

        assert_eq!(state.session_count().await, 1);
        assert!(state.session(fresh.id()).await.is_ok());
        assert!(matches!(state.session(stale.id()).await, Err(WebServerError::SessionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_lookup_keeps_session_alive() {
        let state = limited_state(Duration::from_millis(150), 100);
        let kept = state.create_session().await;
        let dropped = state.create_session().await;

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            state.session(kept.id()).await.unwrap();
        }

        assert_eq!(state.sweep_expired().await, 1);
        assert!(state.session(kept.id()).await.is_ok());
        assert!(state.session(dropped.id()).await.is_err());
    }

    #[tokio::test]
    async fn test_registry_full_evicts_least_recently_used() {
        let state = limited_state(Duration::from_secs(600), 2);
        let first = state.create_session().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = state.create_session().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        state.session(first.id()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let third = state.create_session().await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.session(first.id()).await.is_ok());
        assert!(state.session(third.id()).await.is_ok());
        assert!(matches!(state.session(second.id()).await, Err(WebServerError::SessionNotFound { .. })));
    }
}
