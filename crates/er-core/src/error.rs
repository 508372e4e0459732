//! Core error type.

use thiserror::Error;

/// Errors produced by `er-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `er-core`.
pub type CoreResult<T> = Result<T, CoreError>;
