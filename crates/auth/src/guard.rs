use crate::error::{ClientError, Result};
use appreg_database::ClientStore;
use appreg_models::OAuthClient;
use uuid::Uuid;

/// Load a client on behalf of `user_id`.
///
/// Every by-id operation goes through here first. A client owned by someone
/// else is reported exactly like a missing one, so callers cannot probe for
/// other users' client ids.
pub async fn authorize(store: &dyn ClientStore, user_id: Uuid, client_id: &str) -> Result<OAuthClient> {
    match store.get(client_id).await? {
        Some(client) if client.is_owned_by(user_id) => Ok(client),
        Some(_) => {
            tracing::debug!("User {} denied access to client {}", user_id, client_id);
            Err(ClientError::NotFound)
        }
        None => Err(ClientError::NotFound),
    }
}
