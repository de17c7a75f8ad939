//! In-memory cart storage.

use std::sync::{Arc, PoisonError, RwLock};

use crate::storage::{CartStorage, StorageError};

/// Process-local blob. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    blob: Arc<RwLock<Option<String>>>,
}

impl MemoryCartStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `blob`.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(RwLock::new(Some(blob.into()))),
        }
    }

    /// Current blob, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.blob
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CartStorage for MemoryCartStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot())
    }

    fn write(&self, blob: &str) -> Result<(), StorageError> {
        *self.blob.write().unwrap_or_else(PoisonError::into_inner) = Some(blob.to_string());

        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.blob.write().unwrap_or_else(PoisonError::into_inner) = None;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn clones_share_the_blob() -> TestResult {
        let storage = MemoryCartStorage::new();
        let other = storage.clone();

        storage.write("cart")?;

        assert_eq!(other.read()?.as_deref(), Some("cart"));

        other.remove()?;

        assert_eq!(storage.snapshot(), None);

        Ok(())
    }
}
