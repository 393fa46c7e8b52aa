//! Error types for odata-query
//!
//! This module defines the errors raised while resolving names against
//! the schema, compiling expressions and reading responses.

use thiserror::Error;

/// Errors that can occur during resolution, compilation or extraction
#[derive(Error, Debug)]
pub enum ODataError {
    /// A schema object could not be matched uniquely
    #[error("Unresolvable object [{name}]: {reason}")]
    UnresolvableObject {
        name: String,
        reason: String,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// No compilation strategy for this function/arity combination
    #[error("The function {function} is not supported or called with wrong number of arguments ({arity})")]
    NotSupported {
        function: String,
        arity: usize,
    },

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unsupported literal: {0}")]
    UnsupportedLiteral(String),

    #[error("Cannot convert {value} to {target}")]
    Conversion {
        value: String,
        target: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ODataError {
    /// Shorthand for an `UnresolvableObject` error
    pub fn unresolvable<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        ODataError::UnresolvableObject {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for odata-query operations
pub type Result<T> = std::result::Result<T, ODataError>;
