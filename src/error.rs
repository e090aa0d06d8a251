//! Error types
//!
//! Crate-level error wrapping the session and service errors.

use thiserror::Error;

use crate::service::ServiceError;
use crate::session::SessionError;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
