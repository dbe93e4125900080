//! Error types for Plugdex
//!
//! This module defines the error taxonomy shared by the resolver, the
//! installed-state scanner and the download-target planner. Uses `thiserror`
//! for `Display` and `Error` implementations.
//!
//! "Not applicable" outcomes (no matching platform, plugin not installed) are
//! never errors; they are expressed as `Option::None` by the callers.

use std::io;

use thiserror::Error;

/// The primary error type for Plugdex operations.
#[derive(Error, Debug)]
pub enum PlugdexError {
    /// Configuration-related errors (malformed manifest fields, bad config.json, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A platform selector that cannot be compiled into a matcher.
    #[error("Invalid label selector in plugin '{plugin}': {reason}")]
    InvalidSelector { plugin: String, reason: String },

    /// Filesystem access failed (unreadable directory or link).
    #[error("{context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A link target that does not decompose into `{name}/{version}/...`.
    #[error("Corrupted installation: {0}")]
    CorruptedState(String),

    /// Security violations (unsafe plugin names, path traversal attempts)
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// The plugin has no distribution for the resolved platform.
    #[error("Plugin '{plugin}' is not available for os={os} arch={arch}")]
    NotAvailable {
        plugin: String,
        os: String,
        arch: String,
    },

    /// Resource not found (plugins missing from the catalog, etc.)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlugdexError {
    /// Wrap an I/O error with the path/plugin it concerns.
    pub fn filesystem(context: impl Into<String>, source: io::Error) -> Self {
        Self::Filesystem {
            context: context.into(),
            source,
        }
    }
}

/// A specialized `Result` type for Plugdex operations.
pub type Result<T> = std::result::Result<T, PlugdexError>;
