use crate::error::Result;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| Self::default().url),
        }
    }
}

/// JSON values in Redis, shared with the service that issues sessions
#[derive(Clone)]
pub struct Cache {
    manager: ConnectionManager,
}

impl Cache {
    pub async fn new(config: CacheConfig) -> Result<Self> {
        let client = Client::open(config.url)?;
        let manager = ConnectionManager::new(client).await?;

        Ok(Self { manager })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

pub fn session_cache_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use uuid::Uuid;

    #[test]
    fn test_session_cache_key() {
        assert_eq!(session_cache_key("abc"), "session:abc");
    }

    #[tokio::test]
    #[ignore] // Only run with Redis available
    async fn test_resolve_seeded_session() {
        let cache = Cache::new(CacheConfig::from_env())
            .await
            .expect("Failed to connect to Redis");
        cache.ping().await.expect("Failed to ping Redis");

        let session_id = format!("appreg-test-{}", Uuid::new_v4().simple());
        let key = session_cache_key(&session_id);
        let user_id = Uuid::new_v4();
        let mut conn = cache.manager.clone();
        redis::cmd("SET")
            .arg(&key)
            .arg(format!(r#"{{"user_id":"{}"}}"#, user_id))
            .arg("EX")
            .arg(60)
            .query_async::<()>(&mut conn)
            .await
            .unwrap();

        assert_eq!(cache.resolve(&session_id).await.unwrap(), Some(user_id));

        redis::cmd("DEL").arg(&key).query_async::<()>(&mut conn).await.unwrap();
        assert_eq!(cache.resolve(&session_id).await.unwrap(), None);
    }
}
