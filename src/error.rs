//! Error types raised by builtins and the runtime collaborators they use

use thiserror::Error;

/// Main error type for the builtin layer
///
/// Builtins raise `TypeError` and `RangeError` themselves. Everything else
/// is reported by a lower layer and propagated without inspection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JsError {
    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    /// Marker error indicating a value was thrown (actual value stored in the runtime)
    #[error("Thrown")]
    Thrown,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JsError {
    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    /// Create an internal error for broken runtime invariants
    /// (stale heap references, missing intrinsics). These should never
    /// reach script code in a correct embedding.
    pub fn internal_error(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// Whether this is a TypeError
    pub fn is_type_error(&self) -> bool {
        matches!(self, JsError::TypeError { .. })
    }

    /// The message, if the error carries one
    pub fn message(&self) -> Option<&str> {
        match self {
            JsError::TypeError { message } | JsError::RangeError { message } => Some(message),
            JsError::Internal(message) => Some(message),
            JsError::Thrown => None,
        }
    }
}
