use appreg_auth::ClientError;
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

// Convert ClientError to an HTTP response
pub fn handle_error(error: ClientError) -> (StatusCode, Json<ErrorResponse>) {
    let message = error.to_string();
    match error {
        ClientError::MissingField(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("missing_field", &message)),
        ),
        ClientError::InvalidFieldFormat { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid_field_format", &message)),
        ),
        ClientError::MalformedPatch(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("malformed_patch", &message)),
        ),
        ClientError::UnsupportedOperation(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("unsupported_operation", &message)),
        ),
        ClientError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("not_found", &message)),
        ),
        ClientError::Database(_) | ClientError::Storage(_) => {
            tracing::error!("Request failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("internal_error", "An internal error occurred")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appreg_database::DatabaseError;

    #[test]
    fn test_internal_errors_hide_details() {
        let (status, Json(body)) =
            handle_error(DatabaseError::Other("password=hunter2".to_string()).into());

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "internal_error");
        assert!(!body.message.contains("hunter2"));
    }

    #[test]
    fn test_client_errors_map_to_400() {
        for error in [
            ClientError::MissingField("client_name".to_string()),
            ClientError::invalid("client_uri", "not a URL"),
            ClientError::MalformedPatch("missing 'op'".to_string()),
            ClientError::UnsupportedOperation("'add' is not supported".to_string()),
        ] {
            assert_eq!(handle_error(error).0, StatusCode::BAD_REQUEST);
        }
    }
}
