//! Error types for the slugnotes application.
//!
//! This module defines the error type shared by the storage layer, the notes
//! service and the HTTP layer.

use std::{fmt, io, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Title,
    Text,
    Slug,
    Username,
    Password,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormField::Title => "title",
            FormField::Text => "text",
            FormField::Slug => "slug",
            FormField::Username => "username",
            FormField::Password => "password",
        };
        f.write_str(name)
    }
}

/// The main error type for the slugnotes application.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The note does not exist or the caller may not see it.
    #[error("Note not found")]
    NotFound,

    /// An anonymous identity tried to reach a protected operation.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Submitted form data was rejected; nothing was stored.
    #[error("{field}: {message}")]
    Validation { field: FormField, message: String },

    /// Unknown username or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    #[error("Password hashing failed: {message}")]
    PasswordHash { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}

impl NotesError {
    pub fn validation(field: FormField, message: impl Into<String>) -> Self {
        NotesError::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn poisoned(what: &str) -> Self {
        NotesError::LockAcquisitionFailed {
            message: format!("Failed to acquire lock on {}", what),
        }
    }
}
