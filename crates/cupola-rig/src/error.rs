//! Error types for the cupola-rig crate.

use std::fmt;

/// Result type for cupola-rig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or validating rig configuration.
///
/// Frame updates, geocoding and picking never fail; they resolve to neutral
/// results instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A setting is outside its allowed range.
    InvalidSetting {
        /// Dotted path of the offending setting.
        name: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
    /// Settings JSON could not be parsed.
    Config {
        /// The parser message.
        message: String,
    },
    /// Settings file could not be read.
    Io {
        /// The path that failed.
        path: String,
        /// The error message.
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, detail: impl Into<String>) -> Self {
        Error::InvalidSetting {
            name,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSetting { name, detail } => {
                write!(f, "invalid setting {name}: {detail}")
            }
            Error::Config { message } => write!(f, "failed to parse settings: {message}"),
            Error::Io { path, message } => write!(f, "failed to read {path}: {message}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config {
            message: e.to_string(),
        }
    }
}
