//! Item patches

use serde::{Deserialize, Serialize};

use crate::{
    errors::ValidationError,
    ids::{PlanPriceId, SiteId},
    items::{Dedication, ItemKind, LineItem},
};

/// Partial update of a line item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    /// New quantity, floored at 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Replacement dedication. An empty dedication clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedication: Option<Dedication>,

    /// Switches a sponsorship or adoption to another duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_price_id: Option<PlanPriceId>,

    /// New planting site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<SiteId>,
}

impl ItemPatch {
    /// Patch that only sets the quantity.
    #[must_use]
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Patch that only switches the plan-price.
    #[must_use]
    pub fn plan_price(plan_price_id: PlanPriceId) -> Self {
        Self {
            plan_price_id: Some(plan_price_id),
            ..Self::default()
        }
    }

    /// Returns `true` when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.dedication.is_none()
            && self.plan_price_id.is_none()
            && self.site_id.is_none()
    }

    /// Returns a copy with the quantity clamped to at least one.
    ///
    /// Removal is a separate operation, so a zero quantity never reaches a cart.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            quantity: self.quantity.map(|quantity| quantity.max(1)),
            ..self.clone()
        }
    }

    /// Checks the patch against an item kind without applying it.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyPatch`]: nothing to change.
    /// - [`ValidationError::NotApplicable`]: plan fields on a product.
    pub fn validate_for(&self, kind: ItemKind) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }

        if kind == ItemKind::Product {
            let field = if self.dedication.is_some() {
                Some("dedication")
            } else if self.plan_price_id.is_some() {
                Some("plan_price_id")
            } else if self.site_id.is_some() {
                Some("site_id")
            } else {
                None
            };

            if let Some(field) = field {
                return Err(ValidationError::NotApplicable { field, kind });
            }
        }

        Ok(())
    }
}

impl LineItem {
    /// Applies a patch in place.
    ///
    /// The patch is validated in full first; on error the item is unchanged.
    /// Plan reselection takes the new price from the item's denormalized
    /// alternatives.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyPatch`] or [`ValidationError::NotApplicable`]
    ///   from [`ItemPatch::validate_for`].
    /// - [`ValidationError::UnknownPlanPrice`]: the plan-price is not among the
    ///   item's alternatives.
    pub fn apply_patch(&mut self, patch: &ItemPatch) -> Result<(), ValidationError> {
        patch.validate_for(self.kind())?;

        let reselected = match (patch.plan_price_id, self.details.plan()) {
            (Some(plan_price_id), Some(line)) => Some(
                line.alternative(plan_price_id)
                    .cloned()
                    .ok_or(ValidationError::UnknownPlanPrice(plan_price_id))?,
            ),
            _ => None,
        };

        if let Some(quantity) = patch.quantity {
            self.quantity = quantity.max(1);
        }

        if let Some(option) = &reselected {
            self.unit_price = option.price;
        }

        if let Some(line) = self.details.plan_mut() {
            if let Some(option) = reselected {
                line.plan_id = option.plan_id;
                line.plan_price_id = option.plan_price_id;
                line.duration_months = option.duration_months;
            }

            if let Some(dedication) = &patch.dedication {
                line.dedication = (!dedication.is_empty()).then(|| dedication.clone());
            }

            if let Some(site_id) = patch.site_id {
                line.site_id = Some(site_id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        ids::{PlanId, SubjectId, VariantId},
        items::{
            ItemDetails, ItemDisplay, NewLineItem, PlanLine, PlanOption, ProductLine, TemporaryId,
            VariantSelections,
        },
    };

    use super::*;

    fn option(id: u64, months: u16, price: i64) -> PlanOption {
        PlanOption {
            plan_price_id: PlanPriceId::new(id),
            plan_id: PlanId::new(1),
            duration_months: months,
            price: Decimal::new(price, 0),
        }
    }

    fn adoption() -> LineItem {
        NewLineItem {
            quantity: 1,
            unit_price: Decimal::new(500, 0),
            display: ItemDisplay {
                name: "Mango #12".to_string(),
                image: None,
            },
            details: ItemDetails::Adoption(PlanLine {
                subject_id: SubjectId::new(12),
                plan_id: PlanId::new(1),
                plan_price_id: PlanPriceId::new(100),
                duration_months: 6,
                alternatives: smallvec![option(100, 6, 500), option(101, 12, 900)],
                dedication: None,
                site_id: None,
            }),
        }
        .with_id(TemporaryId::new())
    }

    fn product() -> LineItem {
        NewLineItem {
            quantity: 1,
            unit_price: Decimal::new(100, 0),
            display: ItemDisplay {
                name: "Terracotta planter".to_string(),
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
    fn zero_quantity_is_clamped_to_one() -> TestResult {
        let mut item = product();

        item.apply_patch(&ItemPatch::quantity(0))?;

        assert_eq!(item.quantity, 1);

        Ok(())
    }

    #[test]
    fn normalized_patch_clamps_quantity() {
        assert_eq!(ItemPatch::quantity(0).normalized().quantity, Some(1));
        assert_eq!(ItemPatch::quantity(4).normalized().quantity, Some(4));
    }

    #[test]
    fn plan_reselection_uses_alternative_price() -> TestResult {
        let mut item = adoption();

        item.apply_patch(&ItemPatch::plan_price(PlanPriceId::new(101)))?;

        let Some(line) = item.details.plan() else {
            panic!("expected plan line, got {:?}", item.details);
        };

        assert_eq!(item.unit_price, Decimal::new(900, 0));
        assert_eq!(line.plan_price_id, PlanPriceId::new(101));
        assert_eq!(line.duration_months, 12);

        Ok(())
    }

    #[test]
    fn unknown_plan_price_leaves_item_untouched() {
        let mut item = adoption();
        let before = item.clone();

        let patch = ItemPatch {
            quantity: Some(3),
            plan_price_id: Some(PlanPriceId::new(999)),
            ..ItemPatch::default()
        };

        assert_eq!(
            item.apply_patch(&patch),
            Err(ValidationError::UnknownPlanPrice(PlanPriceId::new(999)))
        );
        assert_eq!(item, before);
    }

    #[test]
    fn dedication_is_set_and_cleared() -> TestResult {
        let mut item = adoption();

        item.apply_patch(&ItemPatch {
            dedication: Some(Dedication {
                name: Some("Grandma".to_string()),
                occasion: Some("Birthday".to_string()),
                message: None,
            }),
            ..ItemPatch::default()
        })?;

        assert!(
            item.details
                .plan()
                .is_some_and(|line| line.dedication.is_some())
        );

        item.apply_patch(&ItemPatch {
            dedication: Some(Dedication::default()),
            ..ItemPatch::default()
        })?;

        assert!(
            item.details
                .plan()
                .is_some_and(|line| line.dedication.is_none())
        );

        Ok(())
    }

    #[test]
    fn plan_fields_are_rejected_on_products() {
        let mut item = product();

        let result = item.apply_patch(&ItemPatch {
            site_id: Some(SiteId::new(1)),
            ..ItemPatch::default()
        });

        assert_eq!(
            result,
            Err(ValidationError::NotApplicable {
                field: "site_id",
                kind: ItemKind::Product,
            })
        );
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert_eq!(
            product().apply_patch(&ItemPatch::default()),
            Err(ValidationError::EmptyPatch)
        );
    }
}
