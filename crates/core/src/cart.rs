//! Cart

use rust_decimal::Decimal;

use crate::{
    items::{LineItem, LineItemId},
    pricing::total_price,
};

/// Where the items of a held cart came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartSource {
    /// Guest cart held on this device.
    Local,

    /// Snapshot returned by the backend.
    Server,
}

/// Cart presented to the UI.
///
/// Always wholly local or wholly server-derived, so every mutation has one
/// unambiguous target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    source: CartSource,
    items: Vec<LineItem>,
}

impl Cart {
    /// Guest cart with the given items.
    pub fn local(items: impl Into<Vec<LineItem>>) -> Self {
        Self {
            source: CartSource::Local,
            items: items.into(),
        }
    }

    /// Server-derived cart with the given items.
    pub fn server(items: impl Into<Vec<LineItem>>) -> Self {
        Self {
            source: CartSource::Server,
            items: items.into(),
        }
    }

    /// Empty guest cart.
    pub fn empty_local() -> Self {
        Self::local(Vec::new())
    }

    /// Where the items came from.
    pub const fn source(&self) -> CartSource {
        self.source
    }

    /// Items in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Looks an item up by id.
    pub fn find(&self, id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of every line total.
    pub fn subtotal(&self) -> Decimal {
        total_price(&self.items)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty_local()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ids::VariantId,
        items::{ItemDetails, ItemDisplay, NewLineItem, ProductLine, TemporaryId, VariantSelections},
    };

    use super::*;

    fn item(price: i64, quantity: u32) -> LineItem {
        NewLineItem {
            quantity,
            unit_price: Decimal::new(price, 0),
            display: ItemDisplay {
                name: "Seed kit".to_string(),
                image: None,
            },
            details: ItemDetails::Product(ProductLine {
                variant_id: VariantId::new(1),
                product_id: None,
                sku: None,
                selections: VariantSelections::default(),
            }),
        }
        .with_id(TemporaryId::new())
    }

    #[test]
    fn default_cart_is_empty_and_local() {
        let cart = Cart::default();

        assert!(cart.is_empty());
        assert_eq!(cart.source(), CartSource::Local);
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn totals() {
        let cart = Cart::server(vec![item(100, 3), item(50, 2)]);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal(), Decimal::new(400, 0));
    }

    #[test]
    fn find_by_id() {
        let first = item(10, 1);
        let id = first.id;
        let cart = Cart::local(vec![first, item(20, 1)]);

        assert_eq!(cart.find(&id).map(|item| item.unit_price), Some(Decimal::new(10, 0)));
    }
}
