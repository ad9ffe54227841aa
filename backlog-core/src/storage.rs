use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{BacklogError, Result};
use crate::models::StoryStore;

/// Handles reading and replacing one JSON story store on disk
pub struct JsonStore {
    file_path: PathBuf,
}

impl JsonStore {
    /// Creates a new JsonStore for the given file path
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.is_file()
    }

    /// Loads the store, failing if it is missing or malformed
    pub fn load(&self) -> Result<StoryStore> {
        if !self.exists() {
            return Err(BacklogError::BacklogNotFound(self.file_path.clone()));
        }

        let file = File::open(&self.file_path).map_err(|e| BacklogError::io(&self.file_path, e))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| BacklogError::json(&self.file_path, e))
    }

    /// Reads the raw JSON document, or `None` when the file is absent,
    /// unreadable or not valid JSON
    pub fn read_value(&self) -> Option<Value> {
        if !self.exists() {
            return None;
        }

        let result = File::open(&self.file_path)
            .map_err(|e| BacklogError::io(&self.file_path, e))
            .and_then(|file| {
                serde_json::from_reader(BufReader::new(file))
                    .map_err(|e| BacklogError::json(&self.file_path, e))
            });

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("Ignoring unreadable store: {}", e);
                None
            }
        }
    }

    /// Replaces the store file with `store`, returning the bytes written.
    ///
    /// The JSON is written to a temporary file next to the target and renamed
    /// over it, so an interrupted run never leaves a truncated store.
    pub fn save(&self, store: &StoryStore) -> Result<u64> {
        let dir = match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| BacklogError::io(&dir, e))?;

        let mut json = serde_json::to_string_pretty(store)
            .map_err(|e| BacklogError::json(&self.file_path, e))?;
        json.push('\n');

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| BacklogError::io(&dir, e))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| BacklogError::io(temp.path(), e))?;
        temp.persist(&self.file_path)
            .map_err(|e| BacklogError::io(&self.file_path, e.error))?;

        log::info!("Wrote {} ({} bytes)", self.file_path.display(), json.len());
        Ok(json.len() as u64)
    }

    /// Size of the store file in whole KB, if it exists
    pub fn size_kb(&self) -> Option<u64> {
        fs::metadata(&self.file_path).ok().map(|m| m.len() / 1024)
    }
}
