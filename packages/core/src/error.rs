//! Error types for the registry, hooks and REST containers.

use hive_pollen::ApiErrorKind;

/// Registry lookup and construction failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HiveError {
    #[error("Honeycomb '{name}' not found")]
    NotFound { name: String },

    #[error("Hook '{name}' not found")]
    HookNotFound { name: String },

    #[error("Honeycomb '{name}' is registered more than once")]
    Duplicate { name: String },

    #[error("'{name}' is not a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

/// Hook misuse inside a render pass.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Hooks were called in a different order than on the first render.
    #[error("hook call order changed between renders at position {position}")]
    OrderMismatch { position: usize },
}

/// Failures of `RestHoneycomb` operations.
#[derive(thiserror::Error, Debug)]
pub enum RestError {
    #[error(transparent)]
    Pollen(#[from] hive_pollen::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("item has no '{key}' field")]
    MissingId { key: String },
}

impl RestError {
    /// The API exception kind, when the server answered with an error status.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            RestError::Pollen(e) => e.api_kind(),
            _ => None,
        }
    }
}
