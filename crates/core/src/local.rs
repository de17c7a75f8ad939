//! Local Cart
//!
//! Ordered table of line items held for a guest visitor. Items are addressed
//! by temporary id, or by server id when the caller only knows that scheme.

use crate::{
    errors::LocalCartError,
    items::{ItemPatch, LineItem, LineItemId, MatchKey, NewLineItem, TemporaryId},
};

/// Guest-side cart table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCart {
    items: Vec<LineItem>,
}

impl LocalCart {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from previously persisted items, in order.
    pub fn with_items(items: impl Into<Vec<LineItem>>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Items in insertion order.
    pub fn list(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the table, returning its items in insertion order.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the table holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks an item up by either id scheme.
    pub fn get(&self, id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Adds an item, collapsing it into an existing one with the same key.
    ///
    /// On a match the new quantity is added to the existing item and the
    /// existing id is returned; otherwise the item is appended under a fresh
    /// temporary id.
    pub fn upsert_by_match(&mut self, item: NewLineItem) -> LineItemId {
        if let Some(existing) = self.find_by_key_mut(item.match_key()) {
            existing.quantity = existing.quantity.saturating_add(item.quantity).max(1);

            return existing.id;
        }

        let item = item.with_id(TemporaryId::new());
        let id = item.id;

        self.items.push(item);

        id
    }

    /// Applies a patch to the item carrying `id`.
    ///
    /// If a plan reselection gives the item the same key as another item, the
    /// two are merged: the other item absorbs the quantity and keeps its
    /// position, the patched item is dropped. Returns the id of the item that
    /// now holds the change.
    ///
    /// # Errors
    ///
    /// - [`LocalCartError::ItemNotFound`]: no item carries `id`.
    /// - [`LocalCartError::Validation`]: the patch was rejected; the table is
    ///   unchanged.
    pub fn update_by_id(
        &mut self,
        id: &LineItemId,
        patch: &ItemPatch,
    ) -> Result<LineItemId, LocalCartError> {
        let position = self.position(id)?;

        let Some(current) = self.items.get(position) else {
            return Err(LocalCartError::ItemNotFound(*id));
        };

        let mut updated = current.clone();
        updated.apply_patch(patch)?;

        let key = updated.match_key();
        let collision = self
            .items
            .iter()
            .enumerate()
            .find(|(index, item)| *index != position && item.match_key() == key)
            .map(|(index, _)| index);

        match collision {
            Some(other) => {
                let quantity = updated.quantity;
                self.items.remove(position);

                let other = if other > position { other - 1 } else { other };

                let Some(target) = self.items.get_mut(other) else {
                    return Err(LocalCartError::ItemNotFound(*id));
                };

                target.quantity = target.quantity.saturating_add(quantity);

                Ok(target.id)
            }
            None => {
                if let Some(slot) = self.items.get_mut(position) {
                    *slot = updated;
                }

                Ok(*id)
            }
        }
    }

    /// Removes the item carrying `id`, returning it.
    ///
    /// # Errors
    ///
    /// - [`LocalCartError::ItemNotFound`]: no item carries `id`.
    pub fn remove_by_id(&mut self, id: &LineItemId) -> Result<LineItem, LocalCartError> {
        let position = self.position(id)?;

        Ok(self.items.remove(position))
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, id: &LineItemId) -> Result<usize, LocalCartError> {
        self.items
            .iter()
            .position(|item| item.id == *id)
            .ok_or(LocalCartError::ItemNotFound(*id))
    }

    fn find_by_key_mut(&mut self, key: MatchKey) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.match_key() == key)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        errors::ValidationError,
        ids::{PlanId, PlanPriceId, ServerItemId, SubjectId, VariantId},
        items::{
            Dedication, ItemDetails, ItemDisplay, PlanLine, PlanOption, ProductLine,
            VariantSelections,
        },
    };

    use super::*;

    fn product(variant: u64, quantity: u32) -> NewLineItem {
        NewLineItem {
            quantity,
            unit_price: Decimal::new(100, 0),
            display: ItemDisplay {
                name: format!("Variant {variant}"),
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

    fn sponsorship(plan_price: u64, quantity: u32) -> NewLineItem {
        let option = |id: u64, months: u16, price: i64| PlanOption {
            plan_price_id: PlanPriceId::new(id),
            plan_id: PlanId::new(1),
            duration_months: months,
            price: Decimal::new(price, 0),
        };

        let selected = option(plan_price, if plan_price == 1 { 12 } else { 24 }, 0);

        NewLineItem {
            quantity,
            unit_price: Decimal::new(if plan_price == 1 { 1_000 } else { 1_800 }, 0),
            display: ItemDisplay {
                name: "Peepal".to_string(),
                image: None,
            },
            details: ItemDetails::Sponsorship(PlanLine {
                subject_id: SubjectId::new(3),
                plan_id: selected.plan_id,
                plan_price_id: selected.plan_price_id,
                duration_months: selected.duration_months,
                alternatives: smallvec![option(1, 12, 1_000), option(2, 24, 1_800)],
                dedication: None,
                site_id: None,
            }),
        }
    }

    #[test]
    fn duplicate_combination_collapses_quantities() {
        let mut cart = LocalCart::new();

        let first = cart.upsert_by_match(product(1, 2));
        let second = cart.upsert_by_match(product(1, 3));

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.list().first().map(|item| item.quantity), Some(5));
    }

    #[test]
    fn distinct_combinations_are_appended_in_order() {
        let mut cart = LocalCart::new();

        cart.upsert_by_match(product(1, 1));
        cart.upsert_by_match(sponsorship(1, 1));
        cart.upsert_by_match(sponsorship(2, 1));
        cart.upsert_by_match(product(2, 1));

        let keys: Vec<MatchKey> = cart.list().iter().map(LineItem::match_key).collect();

        assert_eq!(
            keys,
            [
                MatchKey::Product(VariantId::new(1)),
                MatchKey::Sponsorship(SubjectId::new(3), PlanPriceId::new(1)),
                MatchKey::Sponsorship(SubjectId::new(3), PlanPriceId::new(2)),
                MatchKey::Product(VariantId::new(2)),
            ]
        );
        assert!(cart.list().iter().all(|item| item.id.is_temporary()));
    }

    #[test]
    fn update_clamps_quantity_to_one() -> TestResult {
        let mut cart = LocalCart::new();
        let id = cart.upsert_by_match(product(1, 4));

        cart.update_by_id(&id, &ItemPatch::quantity(0))?;

        assert_eq!(cart.get(&id).map(|item| item.quantity), Some(1));

        Ok(())
    }

    #[test]
    fn update_matches_server_ids_too() -> TestResult {
        let mut cart = LocalCart::with_items(vec![product(1, 1).with_id(ServerItemId::new(42))]);

        let id = LineItemId::Server(ServerItemId::new(42));
        cart.update_by_id(&id, &ItemPatch::quantity(6))?;

        assert_eq!(cart.get(&id).map(|item| item.quantity), Some(6));

        Ok(())
    }

    #[test]
    fn plan_reselection_updates_price_in_place() -> TestResult {
        let mut cart = LocalCart::new();
        let id = cart.upsert_by_match(sponsorship(1, 1));

        let result = cart.update_by_id(&id, &ItemPatch::plan_price(PlanPriceId::new(2)))?;

        assert_eq!(result, id);
        assert_eq!(
            cart.get(&id).map(|item| item.unit_price),
            Some(Decimal::new(1_800, 0))
        );

        Ok(())
    }

    #[test]
    fn plan_reselection_onto_existing_combination_merges() -> TestResult {
        let mut cart = LocalCart::new();
        let twelve = cart.upsert_by_match(sponsorship(1, 2));
        let twenty_four = cart.upsert_by_match(sponsorship(2, 1));

        let result = cart.update_by_id(&twelve, &ItemPatch::plan_price(PlanPriceId::new(2)))?;

        assert_eq!(result, twenty_four);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&twenty_four).map(|item| item.quantity), Some(3));
        assert!(cart.get(&twelve).is_none());

        Ok(())
    }

    #[test]
    fn rejected_patch_leaves_table_unchanged() {
        let mut cart = LocalCart::new();
        let id = cart.upsert_by_match(product(1, 1));
        let before = cart.clone();

        let result = cart.update_by_id(
            &id,
            &ItemPatch {
                dedication: Some(Dedication::default()),
                ..ItemPatch::default()
            },
        );

        assert!(matches!(
            result,
            Err(LocalCartError::Validation(
                ValidationError::NotApplicable { .. }
            ))
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut cart = LocalCart::new();
        let id = LineItemId::from(TemporaryId::new());

        assert_eq!(
            cart.remove_by_id(&id),
            Err(LocalCartError::ItemNotFound(id))
        );
        assert_eq!(
            cart.update_by_id(&id, &ItemPatch::quantity(1)),
            Err(LocalCartError::ItemNotFound(id))
        );
    }

    #[test]
    fn remove_and_clear() -> TestResult {
        let mut cart = LocalCart::new();
        let first = cart.upsert_by_match(product(1, 1));
        cart.upsert_by_match(product(2, 1));

        let removed = cart.remove_by_id(&first)?;

        assert_eq!(removed.id, first);
        assert_eq!(cart.len(), 1);

        cart.clear();

        assert!(cart.is_empty());

        Ok(())
    }
}
