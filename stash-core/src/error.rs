//! Error types for the store.

use thiserror::Error;

/// Errors returned by store construction and mutation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Initial or replacement state was not a JSON object.
    #[error("store `{id}`: state must be an object, got {found}")]
    InvalidStateShape { id: String, found: &'static str },

    /// A patch was not a JSON object.
    #[error("store `{id}`: patch must be an object, got {found}")]
    InvalidPatch { id: String, found: &'static str },

    #[error("patch nests {depth} levels deep, limit is {limit}")]
    PatchTooDeep { depth: usize, limit: usize },

    #[error("store `{0}` is already defined")]
    DuplicateStore(String),

    #[error("store `{0}` is not defined")]
    UnknownStore(String),

    #[error("invalid store config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid store config: {0} must be at least 1")]
    InvalidConfig(&'static str),
}

/// Errors raised by a devtools sink.
///
/// These never propagate out of the store; the bridge logs and drops them.
#[derive(Error, Debug)]
pub enum DevtoolsError {
    #[error("failed to encode devtools message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("devtools transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("devtools rejected message: {0}")]
    Rejected(String),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Human-readable name of a JSON value's type, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
