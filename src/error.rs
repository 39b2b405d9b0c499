//! This module defines all error types used throughout the application.

use std::io;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Two declarations in one batch share a name
    #[error("Duplicate state name: {0}")]
    DuplicateName(String),

    /// A transition or fallback names a state that was never declared
    #[error("Unresolved state reference: {name} (referenced by {referenced_by})")]
    UnresolvedReference { name: String, referenced_by: String },

    /// A declaration batch without any states has no start state
    #[error("Cannot build a machine from an empty declaration list")]
    EmptyMachine,

    /// Malformed declaration input (file syntax, bad transition keys, ...)
    #[error("Declaration error: {0}")]
    Declaration(String),

    /// No built-in machine with that key
    #[error("Unknown machine: {0}")]
    UnknownMachine(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TUI/visualization errors
    #[error("TUI error: {0}")]
    Tui(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a declaration error
    pub fn declaration(msg: impl Into<String>) -> Self {
        Self::Declaration(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a TUI error
    pub fn tui(err: impl std::fmt::Display) -> Self {
        Self::Tui(err.to_string())
    }

    /// Check if the error was raised while wiring a declaration batch
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateName(_) | Error::UnresolvedReference { .. } | Error::EmptyMachine
        )
    }
}

// Implement From traits for common external error types

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Declaration(format!("TOML error: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Declaration(format!("JSON error: {}", err))
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}
