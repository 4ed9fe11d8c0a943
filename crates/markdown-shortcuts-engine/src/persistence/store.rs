use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::io;
use crate::persistence::{PersistedForm, PersistenceError};

/// Key a [`MemoryStore`] files the document under unless told otherwise
pub const DEFAULT_STORAGE_KEY: &str = "markdown-shortcuts-content";

/// Storage medium for a single document, owned by the host.
///
/// `load` returns `Ok(None)` when nothing has been saved yet.
pub trait PersistenceAdapter {
    fn load(&self) -> Result<Option<PersistedForm>, PersistenceError>;
    fn save(&mut self, form: &PersistedForm) -> Result<(), PersistenceError>;
}

/// In-process key-value store holding JSON strings
#[derive(Debug, Clone)]
pub struct MemoryStore {
    key: String,
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: HashMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored value under this store's key
    pub fn raw(&self) -> Option<&str> {
        self.entries.get(&self.key).map(String::as_str)
    }

    /// Overwrite the raw stored value, bypassing encoding
    pub fn set_raw(&mut self, value: impl Into<String>) {
        self.entries.insert(self.key.clone(), value.into());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceAdapter for MemoryStore {
    fn load(&self) -> Result<Option<PersistedForm>, PersistenceError> {
        self.raw().map(PersistedForm::from_json).transpose()
    }

    fn save(&mut self, form: &PersistedForm) -> Result<(), PersistenceError> {
        let json = form.to_json()?;
        self.set_raw(json);
        Ok(())
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceAdapter for FileStore {
    fn load(&self) -> Result<Option<PersistedForm>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = io::read_file(&self.path)?;
        PersistedForm::from_json(&json).map(Some)
    }

    fn save(&mut self, form: &PersistedForm) -> Result<(), PersistenceError> {
        let json = form.to_json()?;
        io::write_file(&self.path, &json)?;
        Ok(())
    }
}
