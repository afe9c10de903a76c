// Multipart form decoding for client create/update requests

use super::ErrorResponse;
use appreg_models::{redirect_uri_index, LogoUpload, NewClientForm, UpdateClientForm};
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::Multipart,
    http::StatusCode,
    Json,
};

/// Recognised fields of a client form; anything else is dropped
#[derive(Debug, Default)]
pub struct ClientFormFields {
    pub client_name: Option<String>,
    pub client_uri: Option<String>,
    pub logo_update_option: Option<String>,
    redirect_uris: Vec<(u32, String)>,
    pub logo: Option<LogoUpload>,
}

impl ClientFormFields {
    /// Read every part of the body, keeping known fields only
    pub async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, (StatusCode, Json<ErrorResponse>)> {
        let mut multipart = multipart.map_err(|rejection| {
            tracing::debug!("Rejected non-multipart body: {}", rejection);
            malformed_form(&rejection.body_text())
        })?;
        let mut fields = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "logo" {
                let data = field.bytes().await.map_err(malformed)?;
                fields.logo = Some(LogoUpload::new(data.to_vec()));
                continue;
            }

            let slot = match name.as_str() {
                "client_name" => &mut fields.client_name,
                "client_uri" => &mut fields.client_uri,
                "logo_update_option" => &mut fields.logo_update_option,
                other => {
                    if let Some(index) = redirect_uri_index(other) {
                        let value = field.text().await.map_err(malformed)?;
                        fields.push_redirect_uri(index, value);
                    }
                    continue;
                }
            };
            *slot = Some(field.text().await.map_err(malformed)?);
        }

        Ok(fields)
    }

    fn push_redirect_uri(&mut self, index: u32, value: String) {
        let value = value.trim();
        if !value.is_empty() {
            self.redirect_uris.push((index, value.to_string()));
        }
    }

    /// Redirect URIs ordered by their `redirect_uriN` index
    pub fn redirect_uris(&self) -> Vec<String> {
        let mut indexed = self.redirect_uris.clone();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, uri)| uri).collect()
    }

    pub fn into_new_client(self) -> NewClientForm {
        NewClientForm {
            redirect_uris: self.redirect_uris(),
            client_name: self.client_name,
            client_uri: self.client_uri,
            logo: self.logo,
        }
    }

    pub fn into_update(self) -> UpdateClientForm {
        UpdateClientForm {
            redirect_uris: self.redirect_uris(),
            client_name: self.client_name,
            client_uri: self.client_uri,
            logo_update_option: self.logo_update_option,
            logo: self.logo,
        }
    }
}

fn malformed(e: MultipartError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::debug!("Unreadable multipart body: {}", e);
    malformed_form(&e.body_text())
}

fn malformed_form(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("malformed_form", message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_uris_sorted_by_index() {
        let mut fields = ClientFormFields::default();
        fields.push_redirect_uri(10, "https://ten.example".to_string());
        fields.push_redirect_uri(2, " https://two.example ".to_string());
        fields.push_redirect_uri(3, "   ".to_string());
        fields.push_redirect_uri(1, "https://one.example".to_string());

        assert_eq!(
            fields.redirect_uris(),
            vec![
                "https://one.example",
                "https://two.example",
                "https://ten.example"
            ]
        );
    }
}
