//! The note entity.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// Maximum length of a note title, in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note
    pub id: Uuid,
    /// Note title
    pub title: String,
    /// Note body, may be empty
    pub text: String,
    /// URL-safe identifier, unique across all notes
    pub slug: String,
    /// The user who created the note
    pub author: UserId,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new note owned by `author`.
    pub fn new(author: UserId, title: String, text: String, slug: String) -> Self {
        let now = Utc::now();

        Note {
            id: Uuid::new_v4(),
            title,
            text,
            slug,
            author,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author == user
    }

    /// Replaces the editable fields. Slug and author never change.
    pub fn apply_edit(&mut self, title: String, text: String) {
        self.title = title;
        self.text = text;
        self.updated_at = Utc::now();
    }
}
