//! Local persistence
//!
//! The guest cart survives restarts as one named blob. [`CartStorage`] is the
//! blob seam; [`LocalCartStore`] owns the in-memory table and writes it
//! through on every mutation.

use mockall::automock;
use thiserror::Error;

mod file;
mod memory;
mod store;

pub use file::{CART_FILE_NAME, FileCartStorage};
pub use memory::MemoryCartStorage;
pub use store::{LocalCartStore, PersistedCart};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the blob failed.
    #[error("cart storage i/o failed")]
    Io(#[from] std::io::Error),

    /// The cart could not be encoded.
    #[error("failed to serialize cart")]
    Serialize(#[from] serde_json::Error),
}

/// Named blob holding the persisted guest cart.
#[automock]
pub trait CartStorage: Send + Sync {
    /// Returns the stored blob, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replaces the stored blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, blob: &str) -> Result<(), StorageError>;

    /// Deletes the stored blob. Deleting a missing blob succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self) -> Result<(), StorageError>;
}
