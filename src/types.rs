//! Core data structures for the slugnotes application.
//!
//! This module contains the primary types used throughout the application,
//! including the request identity and the CLI commands.
use std::fmt;

use clap::Subcommand;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FormField, NotesError};

/// A specialized Result type for slugnotes operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Opaque identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who is behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(UserId),
}

impl Identity {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }

    /// Returns the user id, or `AuthenticationRequired` for anonymous callers.
    pub fn require(&self) -> Result<UserId> {
        self.user_id().ok_or(NotesError::AuthenticationRequired)
    }
}

impl From<UserId> for Identity {
    fn from(id: UserId) -> Self {
        Identity::User(id)
    }
}

/// Data submitted through the note creation form.
#[derive(Debug, Clone, Default)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    /// Explicit slug; derived from the title when absent or empty
    pub slug: Option<String>,
}

impl NoteForm {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        NoteForm {
            title: title.into(),
            text: text.into(),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// A validation failure as shown next to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Available subcommands for the slugnotes application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Register a new user
    CreateUser {
        /// Login handle of the user
        username: String,

        /// Password of the user
        password: String,
    },
}
