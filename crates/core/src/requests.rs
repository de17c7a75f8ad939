//! Add requests

use serde::{Deserialize, Serialize};

use crate::{
    errors::ValidationError,
    ids::{PlanPriceId, SiteId, SubjectId, VariantId},
    items::{Dedication, ItemKind},
};

const fn default_quantity() -> u32 {
    1
}

/// Request to add an item to the cart.
///
/// This is both the guest-side input to the normalizer and the body sent to
/// the backend when the cart is server-backed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemRequest {
    /// Which kind of item is added.
    pub kind: ItemKind,

    /// Variant, for products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,

    /// Tree or tree instance, for sponsorships and adoptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,

    /// Chosen plan-price, for sponsorships and adoptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_price_id: Option<PlanPriceId>,

    /// Units to add; 0 is treated as 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Optional dedication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedication: Option<Dedication>,

    /// Optional planting site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<SiteId>,

    /// Images picked by the caller, in preference order. Client-side only.
    #[serde(skip)]
    pub images: Vec<String>,
}

/// Validated target of an add request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTarget {
    /// A product variant.
    Product {
        /// Variant being bought.
        variant_id: VariantId,
    },

    /// A tree sponsorship.
    Sponsorship {
        /// Sponsored tree.
        subject_id: SubjectId,
        /// Chosen plan-price.
        plan_price_id: PlanPriceId,
    },

    /// A tree adoption.
    Adoption {
        /// Adopted tree instance.
        subject_id: SubjectId,
        /// Chosen plan-price.
        plan_price_id: PlanPriceId,
    },
}

impl AddItemRequest {
    /// Request for a product variant.
    #[must_use]
    pub fn product(variant_id: VariantId, quantity: u32) -> Self {
        Self::empty(ItemKind::Product, quantity).with_variant(variant_id)
    }

    /// Request for a tree sponsorship.
    #[must_use]
    pub fn sponsorship(subject_id: SubjectId, plan_price_id: PlanPriceId, quantity: u32) -> Self {
        Self::plan(ItemKind::Sponsorship, subject_id, plan_price_id, quantity)
    }

    /// Request for a tree adoption.
    #[must_use]
    pub fn adoption(subject_id: SubjectId, plan_price_id: PlanPriceId, quantity: u32) -> Self {
        Self::plan(ItemKind::Adoption, subject_id, plan_price_id, quantity)
    }

    fn plan(
        kind: ItemKind,
        subject_id: SubjectId,
        plan_price_id: PlanPriceId,
        quantity: u32,
    ) -> Self {
        Self {
            subject_id: Some(subject_id),
            plan_price_id: Some(plan_price_id),
            ..Self::empty(kind, quantity)
        }
    }

    const fn empty(kind: ItemKind, quantity: u32) -> Self {
        Self {
            kind,
            variant_id: None,
            subject_id: None,
            plan_price_id: None,
            quantity,
            dedication: None,
            site_id: None,
            images: Vec::new(),
        }
    }

    fn with_variant(mut self, variant_id: VariantId) -> Self {
        self.variant_id = Some(variant_id);
        self
    }

    /// Attaches a dedication.
    #[must_use]
    pub fn with_dedication(mut self, dedication: Dedication) -> Self {
        self.dedication = Some(dedication);
        self
    }

    /// Attaches a planting site.
    #[must_use]
    pub fn with_site(mut self, site_id: SiteId) -> Self {
        self.site_id = Some(site_id);
        self
    }

    /// Attaches caller-chosen images.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.images = images.into_iter().collect();
        self
    }

    /// Quantity to add; never less than one.
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.max(1)
    }

    /// Validates the identifiers required by the request's kind.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingVariantId`]: product without a variant.
    /// - [`ValidationError::MissingSubjectId`] or
    ///   [`ValidationError::MissingPlanPriceId`]: plan request without its
    ///   subject or plan-price.
    /// - [`ValidationError::NotApplicable`]: dedication or site on a product.
    pub fn target(&self) -> Result<ItemTarget, ValidationError> {
        match self.kind {
            ItemKind::Product => {
                let variant_id = self.variant_id.ok_or(ValidationError::MissingVariantId)?;

                if self.dedication.is_some() {
                    return Err(ValidationError::NotApplicable {
                        field: "dedication",
                        kind: self.kind,
                    });
                }

                if self.site_id.is_some() {
                    return Err(ValidationError::NotApplicable {
                        field: "site_id",
                        kind: self.kind,
                    });
                }

                Ok(ItemTarget::Product { variant_id })
            }
            ItemKind::Sponsorship | ItemKind::Adoption => {
                let subject_id = self
                    .subject_id
                    .ok_or(ValidationError::MissingSubjectId(self.kind))?;

                let plan_price_id = self
                    .plan_price_id
                    .ok_or(ValidationError::MissingPlanPriceId(self.kind))?;

                Ok(if self.kind == ItemKind::Sponsorship {
                    ItemTarget::Sponsorship {
                        subject_id,
                        plan_price_id,
                    }
                } else {
                    ItemTarget::Adoption {
                        subject_id,
                        plan_price_id,
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn product_without_variant_is_rejected() {
        let request = AddItemRequest::empty(ItemKind::Product, 1);

        assert_eq!(request.target(), Err(ValidationError::MissingVariantId));
    }

    #[test]
    fn sponsorship_requires_subject_and_plan_price() {
        let mut request = AddItemRequest::sponsorship(SubjectId::new(1), PlanPriceId::new(2), 1);
        request.plan_price_id = None;

        assert_eq!(
            request.target(),
            Err(ValidationError::MissingPlanPriceId(ItemKind::Sponsorship))
        );

        request.subject_id = None;

        assert_eq!(
            request.target(),
            Err(ValidationError::MissingSubjectId(ItemKind::Sponsorship))
        );
    }

    #[test]
    fn dedication_on_product_is_rejected() {
        let request =
            AddItemRequest::product(VariantId::new(1), 1).with_dedication(Dedication::default());

        assert_eq!(
            request.target(),
            Err(ValidationError::NotApplicable {
                field: "dedication",
                kind: ItemKind::Product,
            })
        );
    }

    #[test]
    fn adoption_target() {
        let request = AddItemRequest::adoption(SubjectId::new(4), PlanPriceId::new(8), 1);

        assert_eq!(
            request.target(),
            Ok(ItemTarget::Adoption {
                subject_id: SubjectId::new(4),
                plan_price_id: PlanPriceId::new(8),
            })
        );
    }

    #[test]
    fn zero_quantity_counts_as_one() {
        assert_eq!(
            AddItemRequest::product(VariantId::new(1), 0).effective_quantity(),
            1
        );
    }

    #[test]
    fn wire_body_omits_absent_fields_and_images() -> TestResult {
        let request = AddItemRequest::product(VariantId::new(3), 2)
            .with_images(["https://cdn.example/p.png".to_string()]);

        assert_eq!(
            serde_json::to_value(&request)?,
            json!({ "kind": "product", "variant_id": 3, "quantity": 2 })
        );

        Ok(())
    }
}
