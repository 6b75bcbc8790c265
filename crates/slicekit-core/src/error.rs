//! Error types for slicekit-core

use std::io;
use thiserror::Error;

/// Slicing error type
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or malformed region list, or invalid options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Opening the source, creating the output directory, or
    /// opening/writing/closing a sink failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Wrap a backend-specific error as an I/O failure.
    pub fn io_other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Io(io::Error::other(err))
    }
}

/// Result type for slicing operations
pub type Result<T> = std::result::Result<T, Error>;
