//! Error types for WP-CLI orchestration.
//!
//! Failures reported by WP-CLI itself are not errors here: they travel as
//! text on the record that the operation produced (`db_error`,
//! `size_error`, ...). This enum covers what the caller cannot recover from
//! by reading a record: missing tooling, bad paths and unparseable output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering or managing installations.
#[derive(Debug, Error)]
pub enum Error {
    /// The WP-CLI executable could not be found
    #[error("{tool} not found - install WP-CLI or set `tool` in the config")]
    ToolNotFound {
        /// The executable name or path that was looked up
        tool: String,
    },

    /// The directory does not contain the marker file
    #[error("not a WordPress installation (no {marker}): {}", .path.display())]
    NotAnInstallation {
        /// Directory that was checked
        path: PathBuf,
        /// Marker file name that was expected
        marker: String,
    },

    /// An operation needs the database name but none is known yet
    #[error("database name unknown for {}", .0.display())]
    UnknownDatabase(PathBuf),

    /// WP-CLI output could not be parsed
    #[error("could not parse output of `wp {command}`: {message}")]
    Parse {
        /// Subcommand whose output was malformed
        command: String,
        /// What went wrong
        message: String,
    },

    /// WP-CLI failed and produced nothing to work with
    #[error("`wp {command}` failed: {message}")]
    Command {
        /// Subcommand that failed
        command: String,
        /// First line of its error output
        message: String,
    },

    /// No home directory to scan from
    #[error("could not determine home directory")]
    NoHomeDirectory,

    /// The OS random source failed
    #[error("random source unavailable: {0}")]
    Random(String),

    /// Worker pool could not be created
    #[error("failed to create worker pool: {0}")]
    WorkerPool(String),
}

impl Error {
    /// Build a parse error for the given subcommand.
    pub fn parse(command: &str, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns true if WP-CLI itself reported a failure.
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command { .. })
    }

    /// Returns true if WP-CLI produced output we could not understand.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns true if the error is about the environment rather than a site
    /// (missing tool, no home directory).
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. } | Self::NoHomeDirectory)
    }
}

/// Result type for WP-CLI operations
pub type Result<T> = std::result::Result<T, Error>;
