use super::clients::ClientStore;
use crate::error::{DatabaseError, Result};
use appreg_models::OAuthClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local client store for tests and database-less development runs
#[derive(Clone, Default)]
pub struct MemoryClientStore {
    clients: Arc<RwLock<HashMap<String, OAuthClient>>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn insert(&self, client: &OAuthClient) -> Result<()> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(DatabaseError::duplicate("OAuth client", "this client_id"));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn get(&self, client_id: &str) -> Result<Option<OAuthClient>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<OAuthClient>> {
        let mut owned: Vec<OAuthClient> = self
            .clients
            .read()
            .await
            .values()
            .filter(|client| client.owner_id == owner_id)
            .cloned()
            .collect();

        owned.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        Ok(owned)
    }

    async fn update(&self, client: &OAuthClient) -> Result<()> {
        let mut clients = self.clients.write().await;
        match clients.get_mut(&client.client_id) {
            Some(existing) => {
                *existing = client.clone();
                Ok(())
            }
            None => Err(DatabaseError::not_found("OAuth client", &client.client_id)),
        }
    }

    async fn delete(&self, client_id: &str) -> Result<bool> {
        Ok(self.clients.write().await.remove(client_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn client(id: &str, owner_id: Uuid, age_secs: i64) -> OAuthClient {
        OAuthClient {
            client_id: id.to_string(),
            owner_id,
            client_name: format!("Client {}", id),
            client_uri: "https://client.example".to_string(),
            logo_uri: "/static/default-logo.png".to_string(),
            logo_key: None,
            client_secret: "secret".to_string(),
            redirect_uris: vec!["https://client.example/cb".to_string()],
            scope: String::new(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_ids() {
        let store = MemoryClientStore::new();
        let owner = Uuid::new_v4();

        store.insert(&client("a", owner, 0)).await.unwrap();
        let result = store.insert(&client("a", owner, 0)).await;

        assert!(matches!(result, Err(DatabaseError::DuplicateEntry(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_by_owner_filters_and_orders() {
        let store = MemoryClientStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.insert(&client("newer", alice, 10)).await.unwrap();
        store.insert(&client("older", alice, 60)).await.unwrap();
        store.insert(&client("bobs", bob, 30)).await.unwrap();

        let ids: Vec<String> = store
            .list_by_owner(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.client_id)
            .collect();
        assert_eq!(ids, vec!["older", "newer"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_records() {
        let store = MemoryClientStore::new();
        let record = client("ghost", Uuid::new_v4(), 0);

        assert!(matches!(
            store.update(&record).await,
            Err(DatabaseError::NotFound(_))
        ));
        assert!(!store.delete("ghost").await.unwrap());

        store.insert(&record).await.unwrap();
        assert!(store.delete("ghost").await.unwrap());
        assert!(store.get("ghost").await.unwrap().is_none());
    }
}
