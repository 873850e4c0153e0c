//! Fatal error types for document loading.
//!
//! Only three conditions abort a load: the document cannot be read, the
//! document fails to parse, or the required `[tool.django]` section is
//! absent. Directive-level lookup failures are never fatal; they degrade
//! to null or the declared default inside the resolver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a settings document.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("document not found or unreadable at {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("document at {path} has no [{section}] section")]
    MissingSection { path: PathBuf, section: String },
}

/// Result type for load operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;
