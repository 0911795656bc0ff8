use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use survey_core::{StorageBackend, StoreError};
use tempfile::NamedTempFile;

/// Directory-backed storage: one `<key>.json` file per record.
///
/// Writes go through a temporary file in the same directory and are renamed
/// into place, so a crash never leaves a half-written record behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | ':' => '_',
                other => other,
            })
            .collect();
        self.root.join(format!("{stem}.json"))
    }

    fn io_error(key: &str, source: io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error(key, err)),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|err| Self::io_error(key, err))?;
        let mut temp = NamedTempFile::new_in(&self.root).map_err(|err| Self::io_error(key, err))?;
        temp.write_all(value.as_bytes())
            .map_err(|err| Self::io_error(key, err))?;
        temp.persist(self.path_for(key))
            .map_err(|err| Self::io_error(key, err.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(key, err)),
        }
    }

    fn is_available(&self) -> bool {
        if self.root.is_dir() {
            return true;
        }
        !self.root.exists()
    }
}
