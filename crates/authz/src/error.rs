use thiserror::Error;

/// Why a scope token failed the reserved grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Scope token '{0}' must have the form resource:field.permission")]
    Malformed(String),

    #[error("Unknown scope resource '{resource}' in '{token}'")]
    UnknownResource { token: String, resource: String },

    #[error("Field '{field}' is not reserved for resource '{resource}' in '{token}'")]
    UnknownField {
        token: String,
        resource: String,
        field: String,
    },

    #[error("Unknown permission '{permission}' in '{token}'")]
    UnknownPermission { token: String, permission: String },

    #[error("Scope token '{0}' grants no permission")]
    MissingPermission(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("Malformed patch document: {0}")]
    Malformed(String),

    #[error("Unsupported patch operation: {0}")]
    Unsupported(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(#[from] ScopeError),
}
