//! # Error Handling
//!
//! This module defines the centralized error type for the `gee` library.
//! It uses `thiserror` to derive a single `Error` enum covering every
//! failure that can abort a command *before* any repository work starts,
//! plus the few conditions a batch task can escalate.
//!
//! ## Two kinds of failure
//!
//! `gee` distinguishes between:
//!
//! - **Fatal, pre-batch errors**: the configuration is missing or
//!   malformed, the working directory cannot be read, the worker pool
//!   cannot be built. These are returned as `Err(Error)` and end the
//!   process with a non-zero exit status.
//! - **Per-repository failures**: a `git` subprocess exiting non-zero, a
//!   merge conflict while reapplying local changes, a missing remote.
//!   These are *not* errors in this sense: they are captured in an
//!   [`OperationOutcome`](crate::batch::OperationOutcome) with
//!   `failed = true` and rendered in the final report.
//!
//! A batch task only returns an `Error` for conditions such as a repository
//! parent directory that cannot be created. The orchestrator then folds
//! that error into a failed outcome for that one repository.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for gee operations
#[derive(Error, Debug)]
pub enum Error {
    /// No `gee.toml` was found in the start directory or any of its parents.
    #[error("gee.toml not found in {} or any parent directory (run `gee init` first)", start.display())]
    NotInitialized { start: PathBuf },

    /// The `gee.toml` file could not be parsed or failed validation.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// `gee init` was run where a `gee.toml` already exists.
    #[error("gee.toml already exists at {}", path.display())]
    AlreadyInitialized { path: PathBuf },

    /// The repository is already listed in `gee.toml`.
    #[error("repository {name} already exists at {}", path.display())]
    RepoExists { name: String, path: PathBuf },

    /// No repository with this name is listed in `gee.toml`.
    #[error("{name} not found in gee.toml")]
    RepoNotFound { name: String },

    /// The directory is not a git working tree.
    #[error("not a git repository, {} does not contain a .git directory", path.display())]
    NotAGitRepo { path: PathBuf },

    /// The worker pool for a batch could not be constructed.
    #[error("Unable to start worker pool: {message}")]
    Pool { message: String },

    /// A batch task panicked. The panic is contained to that task.
    #[error("task {index} panicked: {message}")]
    TaskPanicked { index: usize, message: String },

    /// A batch task finished without delivering a result.
    #[error("no result was delivered for task {index}")]
    TaskLost { index: usize },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A TOML serialization error, wrapped from `toml::ser::Error`.
    #[error("TOML serialization error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// A JSON error from the side journal, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_initialized() {
        let error = Error::NotInitialized {
            start: PathBuf::from("/tmp/work"),
        };
        let display = format!("{}", error);
        assert!(display.contains("gee.toml not found"));
        assert!(display.contains("/tmp/work"));
        assert!(display.contains("gee init"));
    }

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "repo #1 has an empty name".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("empty name"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "repo #1 has an empty path".to_string(),
            hint: Some("Add 'path = \"...\"' to the [[repos]] entry".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("[[repos]]"));
    }

    #[test]
    fn test_error_display_repo_not_found() {
        let error = Error::RepoNotFound {
            name: "api".to_string(),
        };
        assert_eq!(format!("{}", error), "api not found in gee.toml");
    }

    #[test]
    fn test_error_display_task_panicked() {
        let error = Error::TaskPanicked {
            index: 3,
            message: "boom".to_string(),
        };
        assert_eq!(format!("{}", error), "task 3 panicked: boom");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("repos = [unclosed").unwrap_err();
        let error: Error = toml_error.into();
        assert!(format!("{}", error).contains("TOML parsing error"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON error"));
    }
}
