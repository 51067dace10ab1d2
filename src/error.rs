//! Error types for sqlbind.

use thiserror::Error;

use crate::dialect::Dialect;

#[derive(Debug, Error)]
pub enum BindError {
    /// The active dialect has no defined mapping for this value/operation.
    /// Fatal and never retried: retrying cannot change dialect capability.
    #[error("{dialect} does not support {what}")]
    Unsupported { dialect: Dialect, what: String },

    /// A value read back from the driver could not be parsed.
    #[error("malformed {ty} value from driver: '{raw}'")]
    Malformed { ty: &'static str, raw: String },

    /// A converter rejected a user-side value.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Error surfaced from the driver boundary (generic get/set on the
    /// opaque codec, slot type mismatches).
    #[error("driver error: {0}")]
    Driver(String),
}

impl BindError {
    /// Create an unsupported-operation error for the given dialect.
    pub fn unsupported(dialect: Dialect, what: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            what: what.into(),
        }
    }

    /// Create a malformed-driver-output error.
    pub fn malformed(ty: &'static str, raw: impl Into<String>) -> Self {
        Self::Malformed { ty, raw: raw.into() }
    }
}

/// Result type alias for binding operations.
pub type BindResult<T> = Result<T, BindError>;
