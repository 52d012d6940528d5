//! Error handling for EngraveKit core types
//!
//! Provides the error types raised while building toolpath hand-off data:
//! - Command errors (stream construction, laser property validation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::property::PropertyKey;
use thiserror::Error;

/// Command stream error type
///
/// Represents configuration errors detected while constructing a
/// [`CommandStream`](crate::CommandStream) or the laser properties it carries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// A command stream was built without its mandatory initial property
    #[error("Initial laser property must be supplied")]
    MissingInitialProperty,

    /// The stream resolution is not a positive, finite DPI value
    #[error("Invalid resolution: {dpi} dpi")]
    InvalidResolution {
        /// The rejected resolution.
        dpi: f64,
    },

    /// A laser property value lies outside the range of its key
    #[error("Property '{key}' out of range: {value} (valid: {min}..={max})")]
    PropertyOutOfRange {
        /// The property key that was being set.
        key: PropertyKey,
        /// The rejected value.
        value: f32,
        /// Smallest accepted value.
        min: f32,
        /// Largest accepted value.
        max: f32,
    },
}

/// Main error type for EngraveKit core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Command stream error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Generic error with message
    #[error("{message}")]
    Other {
        /// The error message.
        message: String,
    },
}

impl Error {
    /// Create a generic error with a message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Result type for EngraveKit core operations
pub type Result<T> = std::result::Result<T, Error>;
