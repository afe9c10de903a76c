use crate::error::{DatabaseError, Result};
use appreg_models::OAuthClient;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Persistent storage for OAuth client records, keyed by `client_id`
///
/// Implementations provide atomic single-record reads and writes; nothing
/// stronger is assumed by callers.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Insert a new record. Fails with `DuplicateEntry` if the id is taken.
    async fn insert(&self, client: &OAuthClient) -> Result<()>;

    async fn get(&self, client_id: &str) -> Result<Option<OAuthClient>>;

    /// All clients registered by `owner_id`, oldest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<OAuthClient>>;

    /// Overwrite every mutable field of an existing record. Fails with `NotFound`.
    async fn update(&self, client: &OAuthClient) -> Result<()>;

    /// Hard delete. Returns whether a record was removed.
    async fn delete(&self, client_id: &str) -> Result<bool>;
}

pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientRepository {
    async fn insert(&self, client: &OAuthClient) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_clients (
                client_id, owner_id, client_name, client_uri, logo_uri, logo_key,
                client_secret, redirect_uris, scope, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&client.client_id)
        .bind(client.owner_id)
        .bind(&client.client_name)
        .bind(&client.client_uri)
        .bind(&client.logo_uri)
        .bind(&client.logo_key)
        .bind(&client.client_secret)
        .bind(sqlx::types::Json(&client.redirect_uris))
        .bind(&client.scope)
        .bind(client.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "OAuth client", "this client_id"))?;

        Ok(())
    }

    async fn get(&self, client_id: &str) -> Result<Option<OAuthClient>> {
        let client = sqlx::query_as::<_, OAuthClient>(
            "SELECT * FROM oauth_clients WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<OAuthClient>> {
        let clients = sqlx::query_as::<_, OAuthClient>(
            r#"
            SELECT * FROM oauth_clients
            WHERE owner_id = $1
            ORDER BY created_at ASC, client_id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn update(&self, client: &OAuthClient) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE oauth_clients
            SET client_name = $2, client_uri = $3, logo_uri = $4, logo_key = $5,
                client_secret = $6, redirect_uris = $7, scope = $8
            WHERE client_id = $1
            "#,
        )
        .bind(&client.client_id)
        .bind(&client.client_name)
        .bind(&client.client_uri)
        .bind(&client.logo_uri)
        .bind(&client.logo_key)
        .bind(&client.client_secret)
        .bind(sqlx::types::Json(&client.redirect_uris))
        .bind(&client.scope)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("OAuth client", &client.client_id));
        }

        Ok(())
    }

    async fn delete(&self, client_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM oauth_clients WHERE client_id = $1")
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
