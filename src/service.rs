//! The notes service: every note operation, with access control applied.
use log::{debug, info};

use crate::{
    validate_note_form, validate_title, AccessPolicy, Identity, Note, NoteForm, NoteStore,
    NotesError, Result,
};

/// Orchestrates note operations on behalf of a request identity.
///
/// Anonymous callers always get `AuthenticationRequired`. Notes that are
/// missing and notes owned by someone else both yield `NotFound`.
pub struct NotesService<S> {
    store: S,
}

impl<S: NoteStore> NotesService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Notes authored by the caller.
    pub fn list(&self, identity: &Identity) -> Result<Vec<Note>> {
        let user = identity.require()?;
        if !AccessPolicy::can_list(identity) {
            return Err(NotesError::AuthenticationRequired);
        }
        self.store.list_by_author(user)
    }

    /// Creates a note authored by the caller.
    pub fn create(&self, identity: &Identity, form: NoteForm) -> Result<Note> {
        let author = identity.require()?;
        if !AccessPolicy::can_create(identity) {
            return Err(NotesError::AuthenticationRequired);
        }

        let validated = validate_note_form(form)?;
        let note = Note::new(author, validated.title, validated.text, validated.slug);
        self.store.insert_unique(note)
    }

    /// Loads a note for its detail page.
    pub fn view(&self, identity: &Identity, slug: &str) -> Result<Note> {
        identity.require()?;
        let note = self.find(slug)?;
        if !AccessPolicy::can_view(identity, &note) {
            debug!("Refusing to show note {} to {:?}", slug, identity);
            return Err(NotesError::NotFound);
        }
        Ok(note)
    }

    /// Loads a note the caller is about to edit or delete.
    pub fn get_for_edit(&self, identity: &Identity, slug: &str) -> Result<Note> {
        identity.require()?;
        let note = self.find(slug)?;
        if !AccessPolicy::can_modify(identity, &note) {
            debug!("Refusing to modify note {} for {:?}", slug, identity);
            return Err(NotesError::NotFound);
        }
        Ok(note)
    }

    /// Replaces the title and text of a note. Slug and author stay.
    pub fn edit(&self, identity: &Identity, slug: &str, title: String, text: String) -> Result<Note> {
        let mut note = self.get_for_edit(identity, slug)?;
        let title = validate_title(title)?;
        note.apply_edit(title, text);
        self.store.update(&note)
    }

    pub fn delete(&self, identity: &Identity, slug: &str) -> Result<()> {
        let note = self.get_for_edit(identity, slug)?;
        self.store.delete(note.id)?;
        info!("User {} deleted note {}", note.author, note.slug);
        Ok(())
    }

    fn find(&self, slug: &str) -> Result<Note> {
        self.store.find_by_slug(slug)?.ok_or(NotesError::NotFound)
    }
}
