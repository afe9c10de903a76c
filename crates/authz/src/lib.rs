pub mod error;
pub mod patch;
pub mod scope;

pub use error::{PatchError, ScopeError};
pub use patch::{apply_patch, parse_patch, ScopePatchOp};
pub use scope::{validate, Field, Permission, Resource, Scope, ScopeToken};
