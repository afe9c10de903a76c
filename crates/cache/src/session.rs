// Session lookup
// Sessions are issued elsewhere; this crate only resolves a session id to the user behind it

use crate::error::{CacheError, Result};
use crate::redis_cache::{session_cache_key, Cache};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session payload stored under `session:{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: Uuid,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// User id behind a session, or None for unknown/expired sessions
    async fn resolve(&self, session_id: &str) -> Result<Option<Uuid>>;
}

#[async_trait]
impl SessionStore for Cache {
    async fn resolve(&self, session_id: &str) -> Result<Option<Uuid>> {
        session_user(self.get(&session_cache_key(session_id)).await)
    }
}

/// An unreadable session value counts as no session
fn session_user(lookup: Result<Option<SessionRecord>>) -> Result<Option<Uuid>> {
    match lookup {
        Ok(record) => Ok(record.map(|r| r.user_id)),
        Err(CacheError::SerializationError(e)) => {
            tracing::warn!("Ignoring unreadable session value: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// In-process sessions, used by tests and local runs without Redis
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `user_id` and return its id
    pub async fn open(&self, user_id: Uuid) -> String {
        let session_id = Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), user_id);
        tracing::debug!("Opened session for user {}", user_id);
        session_id
    }

    pub async fn close(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn resolve(&self, session_id: &str) -> Result<Option<Uuid>> {
        Ok(self.sessions.read().await.get(session_id).copied())
    }
}
