pub mod client;
pub mod error;
pub mod form;
pub mod health;

// Re-export common types
pub use error::{handle_error, ErrorResponse};
