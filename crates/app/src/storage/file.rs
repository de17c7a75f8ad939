//! File-backed cart storage.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::storage::{CartStorage, StorageError};

/// Name of the blob inside the storage directory.
pub const CART_FILE_NAME: &str = "grove-cart.json";

/// Stores the cart blob as a JSON file in a directory.
///
/// Writes go to a sibling temporary file that is then renamed over the blob,
/// so a crash mid-write leaves the previous cart intact.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    /// Stores the blob as [`CART_FILE_NAME`] inside `directory`.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            path: directory.as_ref().join(CART_FILE_NAME),
        }
    }

    /// Full path of the blob.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl CartStorage for FileCartStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&self, blob: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();

        fs::write(&staging, blob)?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), bytes = blob.len(), "saved cart");

        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_blob_reads_as_none() -> TestResult {
        let dir = tempdir()?;
        let storage = FileCartStorage::new(dir.path());

        assert_eq!(storage.read()?, None);

        Ok(())
    }

    #[test]
    fn write_then_read_returns_latest_blob() -> TestResult {
        let dir = tempdir()?;
        let storage = FileCartStorage::new(dir.path().join("nested"));

        storage.write("first")?;
        storage.write("second")?;

        assert_eq!(storage.read()?.as_deref(), Some("second"));
        assert!(storage.path().ends_with(CART_FILE_NAME));
        assert!(!storage.staging_path().exists());

        Ok(())
    }

    #[test]
    fn remove_is_idempotent() -> TestResult {
        let dir = tempdir()?;
        let storage = FileCartStorage::new(dir.path());

        storage.write("{}")?;
        storage.remove()?;
        storage.remove()?;

        assert_eq!(storage.read()?, None);

        Ok(())
    }
}
