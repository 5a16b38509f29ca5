use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{Result, SessionError},
    session::Session,
};

/// Trait for storing and retrieving kiosk sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    async fn delete(&self, id: &str) -> Result<()>;

    /// Like `get`, but a missing session is an error
    async fn get_required(&self, id: &str) -> Result<Session> {
        self.get(id)
            .await?
            .ok_or_else(|| SessionError::SessionNotFound(id.to_string()))
    }
}

/// In-memory implementation of SessionStorage. Sessions live only as long
/// as the process; nothing is persisted across restarts.
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        debug!(session_id = %session.id, "saving session");
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!(session_id = %id, "deleting session");
        self.sessions.remove(id);
        Ok(())
    }
}
