use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a supported image: {0}")]
    InvalidImage(String),

    #[error("Invalid asset key: {0}")]
    InvalidKey(String),
}
