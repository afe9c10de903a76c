//! JSON-Patch style updates to a client's scope.
//!
//! A patch document is an array holding exactly one operation object with
//! `op`, `path` and `value`. Only `replace` on `/` is implemented: the whole
//! scope is overwritten with `value`. Other operations are recognised by name
//! and rejected as unsupported.

use crate::error::PatchError;
use crate::scope::Scope;
use serde::Deserialize;
use serde_json::Value;

/// Operation names from RFC 6902 that parse but have no scope semantics yet
const KNOWN_OPERATIONS: &[&str] = &["add", "remove", "replace", "move", "copy", "test"];

const ROOT_PATH: &str = "/";

/// A parsed, validated scope patch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePatchOp {
    /// `{"op": "replace", "path": "/", "value": "<scope>"}`
    ReplaceAll(Scope),
}

impl ScopePatchOp {
    pub fn apply(self, _current: &Scope) -> Scope {
        match self {
            ScopePatchOp::ReplaceAll(scope) => scope,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOperation {
    op: Option<Value>,
    path: Option<Value>,
    value: Option<Value>,
}

/// Parse and validate a patch document
pub fn parse_patch(document: &Value) -> Result<ScopePatchOp, PatchError> {
    let operations = document
        .as_array()
        .ok_or_else(|| PatchError::Malformed("patch document must be an array".to_string()))?;

    let operation = match operations.as_slice() {
        [operation] => operation,
        _ => {
            return Err(PatchError::Malformed(format!(
                "expected exactly one operation, got {}",
                operations.len()
            )))
        }
    };

    let raw = RawOperation::deserialize(operation)
        .map_err(|_| PatchError::Malformed("operation must be an object".to_string()))?;

    let op = required_string(raw.op, "op")?;
    let path = required_string(raw.path, "path")?;
    let value = required_string(raw.value, "value")?;

    match op.as_str() {
        "replace" if path == ROOT_PATH => Ok(ScopePatchOp::ReplaceAll(Scope::parse(&value)?)),
        "replace" => Err(PatchError::Unsupported(format!(
            "replace is only supported on path '{}', got '{}'",
            ROOT_PATH, path
        ))),
        other if KNOWN_OPERATIONS.contains(&other) => {
            Err(PatchError::Unsupported(format!("'{}' is not supported", other)))
        }
        other => Err(PatchError::Unsupported(format!("unknown operation '{}'", other))),
    }
}

/// Apply a patch document to the current scope, returning the new canonical scope
pub fn apply_patch(current: &Scope, document: &Value) -> Result<Scope, PatchError> {
    Ok(parse_patch(document)?.apply(current))
}

fn required_string(value: Option<Value>, name: &str) -> Result<String, PatchError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) | None => Err(PatchError::Malformed(format!("missing '{}'", name))),
        Some(_) => Err(PatchError::Malformed(format!("'{}' must be a string", name))),
    }
}
