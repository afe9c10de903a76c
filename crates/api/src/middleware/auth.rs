use crate::handlers::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated user context
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Value of the named cookie, if the request carries it
pub fn extract_session_id(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn unauthenticated() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(
            "unauthenticated",
            "A valid session is required",
        )),
    )
}

/// Middleware to require a logged-in session
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let session_id =
        extract_session_id(&headers, &state.session_cookie).ok_or_else(unauthenticated)?;

    let user_id = match state.sessions.resolve(&session_id).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            tracing::debug!("Rejected unknown session");
            return Err(unauthenticated());
        }
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("internal_error", "An internal error occurred")),
            ));
        }
    };

    // Add user context to request extensions
    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
