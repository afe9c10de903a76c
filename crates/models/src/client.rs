use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Third-party OAuth client registration
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OAuthClient {
    pub client_id: String,

    /// User who registered the client; the only principal allowed to see it
    #[serde(skip_serializing)]
    pub owner_id: Uuid,

    pub client_name: String,
    pub client_uri: String,

    /// Either the URI of the stored logo or the default logo URI
    pub logo_uri: String,

    /// Asset store key backing `logo_uri` (None = default logo)
    #[serde(skip_serializing)]
    pub logo_key: Option<String>,

    pub client_secret: String,

    #[sqlx(json)]
    pub redirect_uris: Vec<String>,

    /// Canonical space-delimited scope string
    pub scope: String,

    pub created_at: DateTime<Utc>,
}

impl OAuthClient {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Public projection of a client, without the secret
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSummary {
    pub client_id: String,
    pub client_name: String,
    pub client_uri: String,
    pub logo_uri: String,
    pub redirect_uris: Vec<String>,
    pub scope: String,
    pub created_at: DateTime<Utc>,
}

impl From<&OAuthClient> for ClientSummary {
    fn from(client: &OAuthClient) -> Self {
        Self {
            client_id: client.client_id.clone(),
            client_name: client.client_name.clone(),
            client_uri: client.client_uri.clone(),
            logo_uri: client.logo_uri.clone(),
            redirect_uris: client.redirect_uris.clone(),
            scope: client.scope.clone(),
            created_at: client.created_at,
        }
    }
}

impl From<OAuthClient> for ClientSummary {
    fn from(client: OAuthClient) -> Self {
        Self::from(&client)
    }
}
