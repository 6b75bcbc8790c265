//! Error types for slicekit-io

use std::io;
use thiserror::Error;

/// Audio I/O error type
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File is not in a format we can read or write
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid reader or writer options
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Resampling error
    #[error("Resampling error: {0}")]
    Resample(String),

    /// Invalid audio data
    #[error("Invalid audio data: {0}")]
    InvalidData(String),
}

/// Result type for audio I/O operations
pub type Result<T> = std::result::Result<T, FormatError>;

// Conversions for external library errors at the API boundary

impl From<hound::Error> for FormatError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(e) => FormatError::Io(e),
            hound::Error::Unsupported => {
                FormatError::UnsupportedFormat("WAV variant not supported".into())
            }
            other => FormatError::Io(io::Error::other(other)),
        }
    }
}

impl From<rubato::ResamplerConstructionError> for FormatError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        FormatError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for FormatError {
    fn from(e: rubato::ResampleError) -> Self {
        FormatError::Resample(e.to_string())
    }
}

/// Everything except bad options is an I/O failure to the slicer.
impl From<FormatError> for slicekit_core::Error {
    fn from(e: FormatError) -> Self {
        match e {
            FormatError::Io(e) => slicekit_core::Error::Io(e),
            FormatError::InvalidOptions(message) => slicekit_core::Error::InvalidArgument(message),
            other => slicekit_core::Error::io_other(other),
        }
    }
}
