use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use log::{debug, error, info, trace, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    load_json_file, slug_taken_message, write_json_atomically, Config, FormField, Note,
    NotesError, Result, UserId,
};

/// Storage port used by the notes service.
///
/// Every method is one atomic unit: `insert_unique` checks the slug and
/// stores the note without letting another writer in between.
pub trait NoteStore: Send + Sync {
    fn find_by_slug(&self, slug: &str) -> Result<Option<Note>>;

    /// Notes owned by `author`, oldest first.
    fn list_by_author(&self, author: UserId) -> Result<Vec<Note>>;

    /// Stores a new note, failing with a slug validation error when any note
    /// already uses its slug.
    fn insert_unique(&self, note: Note) -> Result<Note>;

    /// Replaces a stored note with the same id. Slug and author are kept
    /// from the stored version.
    fn update(&self, note: &Note) -> Result<Note>;

    fn delete(&self, id: Uuid) -> Result<()>;

    fn count(&self) -> Result<usize>;
}

/// In-memory note collection with its secondary indexes.
#[derive(Default)]
struct NoteIndex {
    by_id: HashMap<Uuid, Note>,
    by_slug: HashMap<String, Uuid>,
    by_author: HashMap<UserId, HashSet<Uuid>>,
}

impl NoteIndex {
    fn insert(&mut self, note: Note) {
        self.by_slug.insert(note.slug.clone(), note.id);
        self.by_author.entry(note.author).or_default().insert(note.id);
        self.by_id.insert(note.id, note);
    }

    fn remove(&mut self, id: Uuid) -> Option<Note> {
        let note = self.by_id.remove(&id)?;
        self.by_slug.remove(&note.slug);
        if let Some(ids) = self.by_author.get_mut(&note.author) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_author.remove(&note.author);
            }
        }
        Some(note)
    }
}

/// Manages the storage and retrieval of notes.
///
/// Notes live in an in-memory index; when a notes directory is configured
/// every note is also kept as a JSON file there.
pub struct NoteStorage {
    /// Directory where notes are stored, `None` keeps them in memory only
    notes_dir: Option<PathBuf>,

    /// All notes with the slug and author indexes
    index: Mutex<NoteIndex>,
}

impl NoteStorage {
    /// Creates a storage that never touches the file system.
    pub fn in_memory() -> Self {
        debug!("Creating in-memory note storage");
        Self {
            notes_dir: None,
            index: Mutex::new(NoteIndex::default()),
        }
    }

    /// Opens the storage the configuration asks for.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.persist {
            Self::open(config.notes_dir())
        } else {
            Ok(Self::in_memory())
        }
    }

    /// Opens the storage at `notes_dir`, creating the directory if needed and
    /// loading every note found in it.
    pub fn open(notes_dir: impl Into<PathBuf>) -> Result<Self> {
        let notes_dir = notes_dir.into();
        info!("Opening note storage at {}", notes_dir.display());

        if !notes_dir.exists() {
            debug!(
                "Notes directory does not exist, creating: {}",
                notes_dir.display()
            );
            fs::create_dir_all(&notes_dir).map_err(|e| {
                error!("Failed to create notes directory: {}", e);
                NotesError::DirectoryError {
                    path: notes_dir.clone(),
                }
            })?;
        }

        let index = Self::load_notes(&notes_dir);
        Ok(Self {
            notes_dir: Some(notes_dir),
            index: Mutex::new(index),
        })
    }

    /// Loads all notes from disk. Unreadable files and notes whose slug is
    /// already taken are skipped with a warning.
    fn load_notes(notes_dir: &Path) -> NoteIndex {
        let mut index = NoteIndex::default();
        let mut load_errors = 0;

        for entry in WalkDir::new(notes_dir)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            match load_json_file::<Note>(path) {
                Ok(note) if index.by_slug.contains_key(&note.slug) => {
                    warn!(
                        "Skipping note {} from {}: slug {} is already taken",
                        note.id,
                        path.display(),
                        note.slug
                    );
                    load_errors += 1;
                }
                Ok(note) => index.insert(note),
                Err(e) => {
                    warn!("Failed to load note from {}: {}", path.display(), e);
                    load_errors += 1;
                }
            }
        }

        if load_errors > 0 {
            error!("Encountered {} errors while loading notes", load_errors);
        }
        info!("Loaded {} notes", index.by_id.len());
        index
    }

    fn lock(&self) -> Result<MutexGuard<'_, NoteIndex>> {
        self.index.lock().map_err(|e| {
            error!("Failed to acquire lock on notes index: {}", e);
            NotesError::poisoned("notes index")
        })
    }

    /// Helper method to get the file path for a note
    fn note_path(notes_dir: &Path, id: Uuid) -> PathBuf {
        // notes_dir/first_2_chars_of_id/note_id.json
        let id = id.to_string();
        notes_dir.join(&id[0..2]).join(format!("{}.json", id))
    }

    fn save_note_file(&self, note: &Note) -> Result<()> {
        if let Some(notes_dir) = &self.notes_dir {
            let path = Self::note_path(notes_dir, note.id);
            debug!("Writing note {} to {}", note.id, path.display());
            write_json_atomically(&path, note)?;
        }
        Ok(())
    }

    fn remove_note_file(&self, id: Uuid) -> Result<()> {
        let Some(notes_dir) = &self.notes_dir else {
            return Ok(());
        };

        let path = Self::note_path(notes_dir, id);
        if !path.exists() {
            debug!("Note file doesn't exist on disk: {}", path.display());
            return Ok(());
        }

        fs::remove_file(&path).map_err(|e| {
            error!("Failed to delete note file {}: {}", path.display(), e);
            NotesError::Io(e)
        })?;

        if let Some(parent) = path.parent() {
            if parent != notes_dir {
                Self::cleanup_empty_directory(parent);
            }
        }
        Ok(())
    }

    /// Removes a prefix directory once its last note is gone
    fn cleanup_empty_directory(dir_path: &Path) {
        let mut entries = match fs::read_dir(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read directory {}: {}", dir_path.display(), e);
                return;
            }
        };
        if entries.next().is_some() {
            return;
        }

        if let Err(e) = fs::remove_dir(dir_path) {
            warn!(
                "Failed to remove empty directory {}: {}",
                dir_path.display(),
                e
            );
        } else {
            trace!("Removed empty directory {}", dir_path.display());
        }
    }
}

impl NoteStore for NoteStorage {
    fn find_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        trace!("Looking up note by slug: {}", slug);
        let index = self.lock()?;
        Ok(index
            .by_slug
            .get(slug)
            .and_then(|id| index.by_id.get(id))
            .cloned())
    }

    fn list_by_author(&self, author: UserId) -> Result<Vec<Note>> {
        let mut notes = {
            let index = self.lock()?;
            index
                .by_author
                .get(&author)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| index.by_id.get(id))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        notes.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        debug!("Found {} notes of user {}", notes.len(), author);
        Ok(notes)
    }

    fn insert_unique(&self, note: Note) -> Result<Note> {
        let mut index = self.lock()?;

        if index.by_slug.contains_key(&note.slug) {
            debug!("Rejecting note {}: slug {} is taken", note.id, note.slug);
            return Err(NotesError::validation(
                FormField::Slug,
                slug_taken_message(&note.slug),
            ));
        }

        self.save_note_file(&note)?;
        index.insert(note.clone());
        info!("Note created: {} ({})", note.slug, note.id);
        Ok(note)
    }

    fn update(&self, note: &Note) -> Result<Note> {
        let mut index = self.lock()?;

        let stored = index.by_id.get(&note.id).ok_or(NotesError::NotFound)?;
        let updated = Note {
            slug: stored.slug.clone(),
            author: stored.author,
            created_at: stored.created_at,
            ..note.clone()
        };

        self.save_note_file(&updated)?;
        index.by_id.insert(updated.id, updated.clone());
        info!("Note updated: {} ({})", updated.slug, updated.id);
        Ok(updated)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let mut index = self.lock()?;

        if !index.by_id.contains_key(&id) {
            return Err(NotesError::NotFound);
        }

        self.remove_note_file(id)?;
        if let Some(note) = index.remove(id) {
            info!("Note deleted: {} ({})", note.slug, note.id);
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.lock()?.by_id.len())
    }
}
