//! Centralized error type for the slicekit umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] slicekit_core::Error),

    #[error("Format: {0}")]
    Format(#[from] slicekit_io::FormatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error comes from bad caller input rather than I/O.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::Core(slicekit_core::Error::InvalidArgument(_))
                | Error::Format(slicekit_io::FormatError::InvalidOptions(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
