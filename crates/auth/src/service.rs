use crate::error::{ClientError, Result};
use crate::guard::authorize;
use crate::logo::{LogoChange, LogoSaga};
use crate::secrets::{generate_client_id, generate_client_secret, rotate_client_secret};
use appreg_authz::{apply_patch, Scope};
use appreg_database::ClientStore;
use appreg_models::{
    ClientDetails, ClientSummary, LogoUpdateOption, LogoUpload, NewClientForm, OAuthClient,
    UpdateClientForm,
};
use appreg_storage::{sniff_logo, AssetStore};
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Owner-scoped management of OAuth client registrations
#[derive(Clone)]
pub struct ClientService {
    store: Arc<dyn ClientStore>,
    assets: Arc<dyn AssetStore>,
}

impl ClientService {
    pub fn new(store: Arc<dyn ClientStore>, assets: Arc<dyn AssetStore>) -> Self {
        Self { store, assets }
    }

    /// List the caller's clients, without secrets
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ClientSummary>> {
        let clients = self.store.list_by_owner(user_id).await?;
        Ok(clients.iter().map(ClientSummary::from).collect())
    }

    /// Get one of the caller's clients, secret included
    pub async fn get(&self, user_id: Uuid, client_id: &str) -> Result<OAuthClient> {
        authorize(self.store.as_ref(), user_id, client_id).await
    }

    /// Register a new client owned by the caller
    pub async fn create(&self, user_id: Uuid, form: NewClientForm) -> Result<OAuthClient> {
        let mut details = validated(form.details()?)?;
        let logo = checked_logo(form.logo())?;

        if details.redirect_uris.is_empty() {
            details.redirect_uris.push(details.client_uri.clone());
        }

        let mut client = OAuthClient {
            client_id: generate_client_id(),
            owner_id: user_id,
            client_name: details.client_name,
            client_uri: details.client_uri,
            logo_uri: self.assets.default_logo_uri().to_string(),
            logo_key: None,
            client_secret: generate_client_secret(),
            redirect_uris: details.redirect_uris,
            scope: Scope::empty().canonical(),
            created_at: Utc::now().trunc_subsecs(6),
        };

        let change = match logo {
            Some(upload) => LogoChange::Replace(upload),
            None => LogoChange::Keep,
        };

        LogoSaga::stage(self.assets.as_ref(), change, &mut client)
            .await?
            .commit(self.store.insert(&client))
            .await?;

        tracing::info!(
            "Created OAuth client: id={}, name={}, owner={}",
            client.client_id,
            client.client_name,
            user_id
        );

        Ok(client)
    }

    /// Full update of name, URI, redirect URIs and logo
    pub async fn update(
        &self,
        user_id: Uuid,
        client_id: &str,
        form: UpdateClientForm,
    ) -> Result<OAuthClient> {
        let existing = authorize(self.store.as_ref(), user_id, client_id).await?;

        let details = validated(form.details()?)?;
        let option = form
            .logo_option()
            .map_err(|reason| ClientError::invalid("logo_update_option", reason))?;

        let change = match option {
            LogoUpdateOption::Update => {
                let upload = checked_logo(form.logo())?
                    .ok_or_else(|| ClientError::MissingField("logo".to_string()))?;
                LogoChange::Replace(upload)
            }
            LogoUpdateOption::Delete => LogoChange::Reset,
            LogoUpdateOption::NoChange => LogoChange::Keep,
        };

        let mut client = existing;
        client.client_name = details.client_name;
        client.client_uri = details.client_uri;
        if !details.redirect_uris.is_empty() {
            client.redirect_uris = details.redirect_uris;
        }

        LogoSaga::stage(self.assets.as_ref(), change, &mut client)
            .await?
            .commit(self.store.update(&client))
            .await?;

        tracing::info!(
            "Updated OAuth client: id={}, logo_update_option={}",
            client.client_id,
            option
        );

        Ok(client)
    }

    /// Hard delete a client and its stored logo
    pub async fn delete(&self, user_id: Uuid, client_id: &str) -> Result<()> {
        let mut client = authorize(self.store.as_ref(), user_id, client_id).await?;

        let store = self.store.as_ref();
        LogoSaga::stage(self.assets.as_ref(), LogoChange::Reset, &mut client)
            .await?
            .commit(async move {
                match store.delete(client_id).await? {
                    true => Ok(()),
                    false => Err(appreg_database::DatabaseError::not_found(
                        "OAuth client",
                        client_id,
                    )),
                }
            })
            .await?;

        tracing::info!("Deleted OAuth client: id={}, owner={}", client_id, user_id);

        Ok(())
    }

    /// Issue a new secret; nothing else about the client changes
    pub async fn rotate_secret(&self, user_id: Uuid, client_id: &str) -> Result<OAuthClient> {
        let mut client = authorize(self.store.as_ref(), user_id, client_id).await?;

        client.client_secret = rotate_client_secret(&client.client_secret);
        self.store.update(&client).await?;

        tracing::info!("Rotated secret for OAuth client: id={}", client.client_id);

        Ok(client)
    }

    /// Apply a scope patch document to the stored scope
    pub async fn patch_scope(
        &self,
        user_id: Uuid,
        client_id: &str,
        document: &serde_json::Value,
    ) -> Result<OAuthClient> {
        let mut client = authorize(self.store.as_ref(), user_id, client_id).await?;

        let current = Scope::parse(&client.scope).unwrap_or_else(|e| {
            tracing::warn!(
                "Stored scope of client {} is invalid ({}), treating as empty",
                client.client_id,
                e
            );
            Scope::empty()
        });

        let patched = apply_patch(&current, document)?;
        client.scope = patched.canonical();
        self.store.update(&client).await?;

        tracing::info!(
            "Patched scope of OAuth client: id={}, scope='{}'",
            client.client_id,
            client.scope
        );

        Ok(client)
    }
}

fn validated(details: ClientDetails) -> Result<ClientDetails> {
    details.validate()?;
    Ok(details)
}

/// Reject non-image uploads before anything is written
fn checked_logo(logo: Option<&LogoUpload>) -> Result<Option<&LogoUpload>> {
    if let Some(upload) = logo {
        sniff_logo(upload)?;
    }
    Ok(logo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appreg_database::{DatabaseError, MemoryClientStore};
    use appreg_storage::MemoryAssetStore;
    use async_trait::async_trait;
    use serde_json::json;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const GIF: &[u8] = b"GIF89a\x01\0\x01\0";
    const DEFAULT_LOGO: &str = "/static/default-logo.png";

    struct Fixture {
        service: ClientService,
        store: MemoryClientStore,
        assets: MemoryAssetStore,
    }

    fn fixture() -> Fixture {
        let store = MemoryClientStore::new();
        let assets = MemoryAssetStore::new(DEFAULT_LOGO);
        let service = ClientService::new(Arc::new(store.clone()), Arc::new(assets.clone()));
        Fixture {
            service,
            store,
            assets,
        }
    }

    fn new_form(name: &str, uri: &str) -> NewClientForm {
        NewClientForm {
            client_name: Some(name.to_string()),
            client_uri: Some(uri.to_string()),
            ..Default::default()
        }
    }

    fn update_form(option: Option<&str>, logo: Option<&[u8]>) -> UpdateClientForm {
        UpdateClientForm {
            client_name: Some("Renamed".to_string()),
            client_uri: Some("https://renamed.example".to_string()),
            logo_update_option: option.map(str::to_string),
            redirect_uris: Vec::new(),
            logo: logo.map(|bytes| LogoUpload::new(bytes.to_vec())),
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let f = fixture();
        let owner = Uuid::new_v4();

        let client = f
            .service
            .create(owner, new_form("My App", "https://my.example"))
            .await
            .unwrap();

        assert_eq!(client.owner_id, owner);
        assert_eq!(client.logo_uri, DEFAULT_LOGO);
        assert!(client.logo_key.is_none());
        assert_eq!(client.redirect_uris, vec!["https://my.example"]);
        assert_eq!(client.scope, "");
        assert_eq!(client.client_secret.len(), 64);
        assert_eq!(f.store.get(&client.client_id).await.unwrap(), Some(client));
    }

    #[tokio::test]
    async fn test_create_with_logo_and_redirects() {
        let f = fixture();
        let mut form = new_form("My App", "https://my.example");
        form.redirect_uris = vec![
            "https://my.example/a".to_string(),
            "https://my.example/b".to_string(),
        ];
        form.logo = Some(LogoUpload::new(PNG.to_vec()));

        let client = f.service.create(Uuid::new_v4(), form).await.unwrap();

        let key = client.logo_key.clone().unwrap();
        assert!(f.assets.contains(&key).await);
        assert_eq!(client.logo_uri, format!("memory://{}", key));
        assert_eq!(client.redirect_uris.len(), 2);
    }

    #[tokio::test]
    async fn test_create_requires_name_and_uri() {
        let f = fixture();
        let owner = Uuid::new_v4();

        let mut form = new_form("My App", "https://my.example");
        form.client_name = None;
        let err = f.service.create(owner, form).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingField(ref field) if field == "client_name"));

        let mut form = new_form("My App", "https://my.example");
        form.client_uri = None;
        let err = f.service.create(owner, form).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingField(ref field) if field == "client_uri"));

        assert!(f.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_without_writing() {
        let f = fixture();
        let owner = Uuid::new_v4();

        let err = f
            .service
            .create(owner, new_form("My App", "not-a-uri"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidFieldFormat { ref field, .. } if field == "client_uri"));

        let mut form = new_form("My App", "https://my.example");
        form.logo = Some(LogoUpload::new(b"definitely not an image".to_vec()));
        let err = f.service.create(owner, form).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidFieldFormat { ref field, .. } if field == "logo"));

        assert!(f.store.is_empty().await);
        assert!(f.assets.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped() {
        let f = fixture();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        f.service.create(alice, new_form("A1", "https://a1.example")).await.unwrap();
        f.service.create(alice, new_form("A2", "https://a2.example")).await.unwrap();
        f.service.create(bob, new_form("B1", "https://b1.example")).await.unwrap();

        let listed = f.service.list(alice).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|c| c.client_name.starts_with('A')));
    }

    #[tokio::test]
    async fn test_foreign_client_is_not_found_everywhere() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let client = f
            .service
            .create(owner, new_form("Mine", "https://mine.example"))
            .await
            .unwrap();
        let id = client.client_id.as_str();
        let patch = json!([{"op": "replace", "path": "/", "value": "user:pfp.read"}]);

        assert!(matches!(f.service.get(stranger, id).await, Err(ClientError::NotFound)));
        assert!(matches!(
            f.service.update(stranger, id, update_form(None, None)).await,
            Err(ClientError::NotFound)
        ));
        assert!(matches!(f.service.rotate_secret(stranger, id).await, Err(ClientError::NotFound)));
        assert!(matches!(
            f.service.patch_scope(stranger, id, &patch).await,
            Err(ClientError::NotFound)
        ));
        assert!(matches!(f.service.delete(stranger, id).await, Err(ClientError::NotFound)));

        assert_eq!(f.store.get(id).await.unwrap(), Some(client));
    }

    #[tokio::test]
    async fn test_update_fields_and_redirects() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let created = f
            .service
            .create(owner, new_form("Old", "https://old.example"))
            .await
            .unwrap();

        let updated = f
            .service
            .update(owner, &created.client_id, update_form(Some("no-change"), None))
            .await
            .unwrap();
        assert_eq!(updated.client_name, "Renamed");
        assert_eq!(updated.client_uri, "https://renamed.example");
        assert_eq!(updated.redirect_uris, created.redirect_uris);
        assert_eq!(updated.client_secret, created.client_secret);

        let mut form = update_form(None, None);
        form.redirect_uris = vec!["https://renamed.example/callback".to_string()];
        let updated = f.service.update(owner, &created.client_id, form).await.unwrap();
        assert_eq!(updated.redirect_uris, vec!["https://renamed.example/callback"]);

        let mut form = update_form(None, None);
        form.redirect_uris = vec!["bogus".to_string()];
        let err = f.service.update(owner, &created.client_id, form).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidFieldFormat { ref field, .. } if field == "redirect_uris"));
    }

    #[tokio::test]
    async fn test_update_validation() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let created = f
            .service
            .create(owner, new_form("App", "https://app.example"))
            .await
            .unwrap();
        let id = created.client_id.as_str();

        let mut form = update_form(None, None);
        form.client_uri = None;
        assert!(matches!(
            f.service.update(owner, id, form).await,
            Err(ClientError::MissingField(_))
        ));

        assert!(matches!(
            f.service.update(owner, id, update_form(Some("replace"), Some(PNG))).await,
            Err(ClientError::InvalidFieldFormat { ref field, .. }) if field == "logo_update_option"
        ));

        assert!(matches!(
            f.service.update(owner, id, update_form(Some("update"), None)).await,
            Err(ClientError::MissingField(ref field)) if field == "logo"
        ));

        assert_eq!(f.store.get(id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_logo_update_options() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let mut form = new_form("App", "https://app.example");
        form.logo = Some(LogoUpload::new(PNG.to_vec()));
        let created = f.service.create(owner, form).await.unwrap();
        let id = created.client_id.as_str();
        let first_key = created.logo_key.clone().unwrap();

        // no-change ignores an attached file
        let kept = f
            .service
            .update(owner, id, update_form(Some("no-change"), Some(GIF)))
            .await
            .unwrap();
        assert_eq!(kept.logo_uri, created.logo_uri);
        assert_eq!(f.assets.len().await, 1);

        // update swaps the asset
        let replaced = f
            .service
            .update(owner, id, update_form(Some("update"), Some(GIF)))
            .await
            .unwrap();
        let second_key = replaced.logo_key.clone().unwrap();
        assert!(second_key.ends_with(".gif"));
        assert_ne!(replaced.logo_uri, created.logo_uri);
        assert!(!f.assets.contains(&first_key).await);
        assert!(f.assets.contains(&second_key).await);

        // delete falls back to the default
        let reset = f
            .service
            .update(owner, id, update_form(Some("delete"), None))
            .await
            .unwrap();
        assert_eq!(reset.logo_uri, DEFAULT_LOGO);
        assert!(reset.logo_key.is_none());
        assert!(f.assets.is_empty().await);
    }

    struct FailingUpdates(MemoryClientStore);

    #[async_trait]
    impl ClientStore for FailingUpdates {
        async fn insert(&self, client: &OAuthClient) -> appreg_database::Result<()> {
            self.0.insert(client).await
        }

        async fn get(&self, client_id: &str) -> appreg_database::Result<Option<OAuthClient>> {
            self.0.get(client_id).await
        }

        async fn list_by_owner(&self, owner_id: Uuid) -> appreg_database::Result<Vec<OAuthClient>> {
            self.0.list_by_owner(owner_id).await
        }

        async fn update(&self, _client: &OAuthClient) -> appreg_database::Result<()> {
            Err(DatabaseError::Other("connection reset".to_string()))
        }

        async fn delete(&self, client_id: &str) -> appreg_database::Result<bool> {
            self.0.delete(client_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_record_write_keeps_previous_logo() {
        let store = MemoryClientStore::new();
        let assets = MemoryAssetStore::new(DEFAULT_LOGO);
        let service = ClientService::new(
            Arc::new(FailingUpdates(store.clone())),
            Arc::new(assets.clone()),
        );
        let owner = Uuid::new_v4();

        let mut form = new_form("App", "https://app.example");
        form.logo = Some(LogoUpload::new(PNG.to_vec()));
        let created = service.create(owner, form).await.unwrap();
        let original_key = created.logo_key.clone().unwrap();

        let err = service
            .update(owner, &created.client_id, update_form(Some("update"), Some(GIF)))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Database(_)));

        let stored = store.get(&created.client_id).await.unwrap().unwrap();
        assert_eq!(stored.logo_uri, created.logo_uri);
        assert!(assets.contains(&original_key).await);
        assert_eq!(assets.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let mut form = new_form("App", "https://app.example");
        form.logo = Some(LogoUpload::new(PNG.to_vec()));
        let created = f.service.create(owner, form).await.unwrap();

        f.service.delete(owner, &created.client_id).await.unwrap();
        assert!(f.store.is_empty().await);
        assert!(f.assets.is_empty().await);

        assert!(matches!(
            f.service.delete(owner, &created.client_id).await,
            Err(ClientError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_rotate_secret_changes_only_secret() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let created = f
            .service
            .create(owner, new_form("App", "https://app.example"))
            .await
            .unwrap();

        let rotated = f.service.rotate_secret(owner, &created.client_id).await.unwrap();

        assert_ne!(rotated.client_secret, created.client_secret);
        let mut expected = created.clone();
        expected.client_secret = rotated.client_secret.clone();
        assert_eq!(rotated, expected);
        assert_eq!(f.store.get(&created.client_id).await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_patch_scope() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let created = f
            .service
            .create(owner, new_form("App", "https://app.example"))
            .await
            .unwrap();
        let id = created.client_id.as_str();

        let patch = json!([{"op": "replace", "path": "/", "value": "user:username.read"}]);
        let patched = f.service.patch_scope(owner, id, &patch).await.unwrap();
        assert_eq!(patched.scope, "user:username.read");

        let patch = json!([{
            "op": "replace",
            "path": "/",
            "value": "user:username.read.write user:pfp.read"
        }]);
        let patched = f.service.patch_scope(owner, id, &patch).await.unwrap();
        assert_eq!(patched.scope, "user:pfp.read user:username.read.write");
        assert_eq!(f.store.get(id).await.unwrap().unwrap().scope, patched.scope);
    }

    #[tokio::test]
    async fn test_patch_scope_errors_leave_scope_alone() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let created = f
            .service
            .create(owner, new_form("App", "https://app.example"))
            .await
            .unwrap();
        let id = created.client_id.as_str();

        let cases = [
            json!([{"op": "replace", "path": "/"}]),
            json!([{"op": "add", "path": "/", "value": "user:pfp.read"}]),
            json!([{"op": "replace", "path": "/", "value": "user;username.read.write"}]),
            json!([{"op": "replace", "path": "/", "value": "user:age.read.write"}]),
        ];

        let errors: Vec<ClientError> = patch_errors(&f.service, owner, id, &cases).await;
        assert!(matches!(errors[0], ClientError::MalformedPatch(_)));
        assert!(matches!(errors[1], ClientError::UnsupportedOperation(_)));
        assert!(matches!(errors[2], ClientError::InvalidFieldFormat { ref field, .. } if field == "scope"));
        assert!(matches!(errors[3], ClientError::InvalidFieldFormat { ref field, .. } if field == "scope"));

        assert_eq!(f.store.get(id).await.unwrap().unwrap().scope, "");
    }

    async fn patch_errors(
        service: &ClientService,
        owner: Uuid,
        id: &str,
        cases: &[serde_json::Value],
    ) -> Vec<ClientError> {
        let mut errors = Vec::new();
        for document in cases {
            errors.push(service.patch_scope(owner, id, document).await.unwrap_err());
        }
        errors
    }
}
