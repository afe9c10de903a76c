use super::form::ClientFormFields;
use super::{handle_error, ErrorResponse};
use crate::middleware::AuthUser;
use crate::AppState;
use appreg_models::{ClientSummary, OAuthClient};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// List the caller's clients
/// GET /app
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<ClientSummary>>, ApiError> {
    let clients = state
        .client_service
        .list(auth_user.user_id)
        .await
        .map_err(handle_error)?;

    Ok(Json(clients))
}

/// Register a new client
/// POST /app
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<OAuthClient>), ApiError> {
    let form = ClientFormFields::read(multipart).await?.into_new_client();

    let client = state
        .client_service
        .create(auth_user.user_id, form)
        .await
        .map_err(handle_error)?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// Get a client, secret included
/// GET /app/:client_id
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(client_id): Path<String>,
) -> Result<Json<OAuthClient>, ApiError> {
    let client = state
        .client_service
        .get(auth_user.user_id, &client_id)
        .await
        .map_err(handle_error)?;

    Ok(Json(client))
}

/// Replace a client's details and optionally its logo
/// PUT /app/:client_id
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(client_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OAuthClient>, ApiError> {
    let form = ClientFormFields::read(multipart).await?.into_update();

    let client = state
        .client_service
        .update(auth_user.user_id, &client_id, form)
        .await
        .map_err(handle_error)?;

    Ok(Json(client))
}

/// Delete a client
/// DELETE /app/:client_id
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(client_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .client_service
        .delete(auth_user.user_id, &client_id)
        .await
        .map_err(handle_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Issue a new client secret
/// PATCH /app/:client_id/secret
pub async fn rotate_secret(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(client_id): Path<String>,
) -> Result<Json<OAuthClient>, ApiError> {
    let client = state
        .client_service
        .rotate_secret(auth_user.user_id, &client_id)
        .await
        .map_err(handle_error)?;

    Ok(Json(client))
}

/// Patch the client's scope
/// PATCH /app/:client_id/scope
///
/// The body is read as raw bytes so `application/json-patch+json` works as
/// well as plain JSON.
pub async fn patch_scope(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(client_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<Json<OAuthClient>, ApiError> {
    let document: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("malformed_patch", &e.to_string())),
        )
    })?;

    let client = state
        .client_service
        .patch_scope(auth_user.user_id, &client_id, &document)
        .await
        .map_err(handle_error)?;

    Ok(Json(client))
}
