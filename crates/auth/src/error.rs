use appreg_authz::{PatchError, ScopeError};
use appreg_database::DatabaseError;
use appreg_storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidFieldFormat { field: String, reason: String },

    #[error("Malformed patch document: {0}")]
    MalformedPatch(String),

    #[error("Unsupported patch operation: {0}")]
    UnsupportedOperation(String),

    /// The client does not exist or belongs to someone else
    #[error("Client not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Asset storage error: {0}")]
    Storage(StorageError),
}

impl ClientError {
    pub fn invalid(field: &str, reason: impl ToString) -> Self {
        ClientError::InvalidFieldFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<DatabaseError> for ClientError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => ClientError::NotFound,
            other => ClientError::Database(other),
        }
    }
}

impl From<StorageError> for ClientError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidImage(reason) => ClientError::invalid("logo", reason),
            other => ClientError::Storage(other),
        }
    }
}

impl From<ScopeError> for ClientError {
    fn from(err: ScopeError) -> Self {
        ClientError::invalid("scope", err)
    }
}

impl From<PatchError> for ClientError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::Malformed(msg) => ClientError::MalformedPatch(msg),
            PatchError::Unsupported(msg) => ClientError::UnsupportedOperation(msg),
            PatchError::InvalidScope(scope_err) => scope_err.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err
            .field_errors()
            .keys()
            .min()
            .map(|field| field.to_string())
            .unwrap_or_else(|| "form".to_string());
        ClientError::invalid(&field, err)
    }
}

impl From<appreg_models::MissingField> for ClientError {
    fn from(err: appreg_models::MissingField) -> Self {
        ClientError::MissingField(err.0.to_string())
    }
}
