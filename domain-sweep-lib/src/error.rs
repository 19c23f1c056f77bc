//! Error handling for domain sweeping operations.
//!
//! Only startup-time errors (bad pattern, bad alphabet, bad configuration,
//! an output file that cannot be created) are meant to stop a run. Resolution
//! failures and sink write failures are produced and contained inside the
//! scheduler; they show up as counters, never as an aborted sweep.

use std::fmt;
use std::time::Duration;

/// Main error type for domain sweeping operations.
#[derive(Debug, Clone)]
pub enum SweepError {
    /// The wildcard pattern is empty or malformed
    InvalidPattern { pattern: String, reason: String },

    /// The substitution alphabet is empty or contains duplicates
    InvalidAlphabet { reason: String },

    /// Name resolution failed for a reason other than "no such name"
    Resolution { domain: String, message: String },

    /// An operation did not complete within its time budget
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// A discovered domain could not be written to the result sink
    SinkWrite { path: String, message: String },

    /// Configuration errors (invalid settings, unparsable TOML, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading configuration or creating output
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl SweepError {
    /// Create a new invalid pattern error.
    pub fn invalid_pattern<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid alphabet error.
    pub fn invalid_alphabet<R: Into<String>>(reason: R) -> Self {
        Self::InvalidAlphabet {
            reason: reason.into(),
        }
    }

    /// Create a new resolution error.
    pub fn resolution<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::Resolution {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new sink write error.
    pub fn sink_write<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::SinkWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pattern '{}': {}", pattern, reason)
            }
            Self::InvalidAlphabet { reason } => {
                write!(f, "Invalid alphabet: {}", reason)
            }
            Self::Resolution { domain, message } => {
                write!(f, "Resolution failed for '{}': {}", domain, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::SinkWrite { path, message } => {
                write!(f, "Failed to write result to '{}': {}", path, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for SweepError {}

impl From<std::io::Error> for SweepError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for SweepError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
