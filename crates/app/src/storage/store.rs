//! Local cart store.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use grove::{
    LocalCartError,
    items::{ItemPatch, LineItem, LineItemId, NewLineItem},
    local::LocalCart,
};

use crate::storage::{CartStorage, StorageError};

const FORMAT_VERSION: u32 = 1;

/// Persisted form of the guest cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCart<I = LineItem> {
    /// Blob format version.
    pub version: u32,
    /// When the blob was written.
    pub saved_at: Timestamp,
    /// Items in insertion order.
    pub items: Vec<I>,
}

/// Guest cart table with write-through persistence.
///
/// Every mutation is saved immediately. Save failures are logged and do not
/// fail the mutation; the in-memory table stays authoritative.
pub struct LocalCartStore {
    cart: LocalCart,
    storage: Arc<dyn CartStorage>,
}

impl Debug for LocalCartStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LocalCartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl LocalCartStore {
    /// Restores the table from `storage`.
    ///
    /// Never fails: an unreadable blob yields an empty table and malformed or
    /// server-identified items are dropped, each with a warning.
    pub fn load(storage: Arc<dyn CartStorage>) -> Self {
        let items = match storage.read() {
            Ok(Some(blob)) => decode(&blob),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, "failed to read saved cart, starting empty");
                Vec::new()
            }
        };

        debug!(items = items.len(), "restored guest cart");

        Self {
            cart: LocalCart::with_items(items),
            storage,
        }
    }

    /// The in-memory table.
    pub fn cart(&self) -> &LocalCart {
        &self.cart
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        self.cart.list()
    }

    /// Returns `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Adds or merges an item; see [`LocalCart::upsert_by_match`].
    pub fn upsert(&mut self, item: NewLineItem) -> LineItemId {
        let id = self.cart.upsert_by_match(item);
        self.persist();

        id
    }

    /// Patches an item; see [`LocalCart::update_by_id`].
    ///
    /// # Errors
    ///
    /// Returns the table's error; nothing is saved in that case.
    pub fn update(
        &mut self,
        id: &LineItemId,
        patch: &ItemPatch,
    ) -> Result<LineItemId, LocalCartError> {
        let id = self.cart.update_by_id(id, patch)?;
        self.persist();

        Ok(id)
    }

    /// Removes an item.
    ///
    /// # Errors
    ///
    /// Returns [`LocalCartError::ItemNotFound`] for unknown ids.
    pub fn remove(&mut self, id: &LineItemId) -> Result<LineItem, LocalCartError> {
        let item = self.cart.remove_by_id(id)?;
        self.persist();

        Ok(item)
    }

    /// Empties the table and deletes the saved blob.
    pub fn clear(&mut self) {
        self.cart.clear();

        if let Err(error) = self.storage.remove() {
            warn!(%error, "failed to delete saved cart");
        }
    }

    /// Writes the table to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be encoded or written.
    pub fn save(&self) -> Result<(), StorageError> {
        let persisted = PersistedCart {
            version: FORMAT_VERSION,
            saved_at: Timestamp::now(),
            items: self.cart.list().iter().collect::<Vec<_>>(),
        };

        let blob = serde_json::to_string(&persisted)?;

        self.storage.write(&blob)
    }

    fn persist(&self) {
        if let Err(error) = self.save() {
            warn!(%error, "failed to save cart, keeping changes in memory");
        }
    }
}

fn decode(blob: &str) -> Vec<LineItem> {
    let persisted: PersistedCart<serde_json::Value> = match serde_json::from_str(blob) {
        Ok(persisted) => persisted,
        Err(error) => {
            warn!(%error, "saved cart is unreadable, starting empty");
            return Vec::new();
        }
    };

    if persisted.version != FORMAT_VERSION {
        warn!(
            version = persisted.version,
            "saved cart has an unknown format, starting empty"
        );
        return Vec::new();
    }

    persisted
        .items
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<LineItem>(value) {
            Ok(item) if item.id.is_temporary() => Some(item),
            Ok(item) => {
                warn!(id = %item.id, "dropping server item from saved guest cart");
                None
            }
            Err(error) => {
                warn!(%error, "dropping malformed item from saved cart");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use grove::{
        ids::{ServerItemId, VariantId},
        items::{ItemDetails, ItemDisplay, ProductLine, TemporaryId, VariantSelections},
    };
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use crate::storage::{MemoryCartStorage, MockCartStorage};

    use super::*;

    fn planter(variant: u64, quantity: u32) -> NewLineItem {
        NewLineItem {
            quantity,
            unit_price: Decimal::new(2_500, 2),
            display: ItemDisplay {
                name: "Clay planter".to_string(),
                image: None,
            },
            details: ItemDetails::Product(ProductLine {
                variant_id: VariantId::new(variant),
                product_id: None,
                sku: None,
                selections: VariantSelections::default(),
            }),
        }
    }

    #[test]
    fn mutations_are_written_through() -> TestResult {
        let storage = MemoryCartStorage::new();
        let mut store = LocalCartStore::load(Arc::new(storage.clone()));

        let id = store.upsert(planter(1, 2));
        store.upsert(planter(2, 1));
        store.update(&id, &ItemPatch::quantity(5))?;

        let restored = LocalCartStore::load(Arc::new(storage.clone()));

        assert_eq!(restored.items(), store.items());
        assert_eq!(restored.cart().get(&id).map(|item| item.quantity), Some(5));

        store.remove(&id)?;

        assert_eq!(LocalCartStore::load(Arc::new(storage)).items().len(), 1);

        Ok(())
    }

    #[test]
    fn clear_deletes_the_blob() {
        let storage = MemoryCartStorage::new();
        let mut store = LocalCartStore::load(Arc::new(storage.clone()));

        store.upsert(planter(1, 1));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(storage.snapshot(), None);
    }

    #[test]
    fn failed_update_saves_nothing() {
        let mut storage = MockCartStorage::new();

        storage.expect_read().returning(|| Ok(None));
        storage.expect_write().never();

        let mut store = LocalCartStore::load(Arc::new(storage));
        let missing = LineItemId::Server(ServerItemId::new(9));

        assert!(matches!(
            store.update(&missing, &ItemPatch::quantity(2)),
            Err(LocalCartError::ItemNotFound(_))
        ));
    }

    #[test]
    fn write_failures_do_not_fail_mutations() {
        let mut storage = MockCartStorage::new();

        storage.expect_read().returning(|| Ok(None));
        storage
            .expect_write()
            .times(1)
            .returning(|_| Err(std::io::Error::other("disk full").into()));

        let mut store = LocalCartStore::load(Arc::new(storage));

        store.upsert(planter(1, 1));

        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn unreadable_blob_starts_empty() {
        let storage = MemoryCartStorage::with_blob("{not json");

        assert!(LocalCartStore::load(Arc::new(storage)).is_empty());
    }

    #[test]
    fn read_failures_start_empty() {
        let mut storage = MockCartStorage::new();

        storage
            .expect_read()
            .returning(|| Err(std::io::Error::other("denied").into()));

        assert!(LocalCartStore::load(Arc::new(storage)).is_empty());
    }

    #[test]
    fn malformed_and_server_items_are_dropped() -> TestResult {
        let kept = planter(1, 2).with_id(TemporaryId::new());
        let server = planter(2, 1).with_id(ServerItemId::new(4));

        let blob = json!({
            "version": 1,
            "saved_at": "2026-01-02T03:04:05Z",
            "items": [
                serde_json::to_value(&kept)?,
                { "id": { "temporary": "nope" }, "kind": "product" },
                serde_json::to_value(&server)?
            ]
        });

        let store = LocalCartStore::load(Arc::new(MemoryCartStorage::with_blob(blob.to_string())));

        assert_eq!(store.items(), [kept]);

        Ok(())
    }

    #[test]
    fn unknown_format_version_starts_empty() {
        let blob = json!({
            "version": 99,
            "saved_at": "2026-01-02T03:04:05Z",
            "items": []
        });

        let store = LocalCartStore::load(Arc::new(MemoryCartStorage::with_blob(blob.to_string())));

        assert!(store.is_empty());
    }
}
