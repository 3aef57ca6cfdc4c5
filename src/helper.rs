use std::{
    fs,
    io::Write,
    path::Path,
};

use log::{debug, error, trace};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{NotesError, Result};

/// Helper method to load a single JSON document from file
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading JSON from file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to open file {}: {}", path.display(), e);
        NotesError::Io(e)
    })?;

    let value = serde_json::from_str(&content)?;
    trace!("Successfully loaded {}", path.display());
    Ok(value)
}

/// Writes `value` as pretty JSON, replacing `path` atomically
pub fn write_json_atomically<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    // Ensure the parent directory exists
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        debug!("Creating parent directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            NotesError::Io(e)
        })?;
    }

    // Create a temporary file in the same directory (for atomic operation)
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file: {}", e);
        NotesError::Io(e)
    })?;

    trace!("Serializing to JSON");
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        error!("Failed to serialize {}: {}", path.display(), e);
        NotesError::Serialization(e)
    })?;

    temp_file.write_all(json.as_bytes()).map_err(|e| {
        error!("Failed to write to temporary file: {}", e);
        NotesError::Io(e)
    })?;
    temp_file.flush()?;

    // Atomically move the temporary file to the target location
    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        NotesError::Io(e.error)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("value.json");

        let mut value = BTreeMap::new();
        value.insert("key".to_string(), 42);
        write_json_atomically(&path, &value).unwrap();

        let loaded: BTreeMap<String, i32> = load_json_file(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_json_file::<BTreeMap<String, i32>>(&dir.path().join("absent.json"))
            .unwrap_err();
        assert!(matches!(err, NotesError::Io(_)), "wrong error type: {err:#?}");
    }
}
