//! Line Items
//!
//! A line item is one canonical cart entry. Product variants, tree
//! sponsorships and tree adoptions share the price, quantity and display
//! fields and carry their own payload in [`ItemDetails`].

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    ids::{PlanId, PlanPriceId, ProductId, SiteId, SubjectId, VariantId},
    requests::AddItemRequest,
};

mod identity;
pub mod patch;

pub use identity::{LineItemId, ParseLineItemIdError, TemporaryId};
pub use patch::ItemPatch;

/// Closed set of purchasable item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Catalog product variant.
    Product,

    /// Tree sponsorship plan.
    Sponsorship,

    /// Tree adoption.
    Adoption,
}

impl ItemKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Sponsorship => "sponsorship",
            Self::Adoption => "adoption",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Presentational fields copied at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDisplay {
    /// Name shown in the cart.
    pub name: String,

    /// Image reference; `None` means the UI shows a placeholder.
    #[serde(default)]
    pub image: Option<String>,
}

/// Color, size and planter selections of a product variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelections {
    /// Selected color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Selected size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Selected planter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planter: Option<String>,
}

/// Product-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    /// Variant being bought.
    pub variant_id: VariantId,

    /// Parent product, when known.
    #[serde(default)]
    pub product_id: Option<ProductId>,

    /// Stock keeping unit.
    #[serde(default)]
    pub sku: Option<String>,

    /// Variant selections shown in the cart.
    #[serde(default)]
    pub selections: VariantSelections,
}

/// Free-text dedication attached to a sponsorship or adoption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dedication {
    /// Who the tree is dedicated to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Occasion, e.g. a birthday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,

    /// Personal message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Dedication {
    /// Returns `true` when no field carries visible text.
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.occasion, &self.message]
            .into_iter()
            .all(|field| field.as_deref().is_none_or(|text| text.trim().is_empty()))
    }
}

/// A plan duration and price the buyer may switch to in-cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOption {
    /// Plan-price the buyer would switch to.
    pub plan_price_id: PlanPriceId,
    /// Plan the price belongs to.
    pub plan_id: PlanId,
    /// Plan length in months.
    pub duration_months: u16,
    /// Price for the whole duration.
    pub price: Decimal,
}

/// Alternative plan choices, denormalized onto the item.
pub type PlanOptions = SmallVec<[PlanOption; 4]>;

/// Sponsorship and adoption payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLine {
    /// Tree for sponsorships, tree instance for adoptions.
    pub subject_id: SubjectId,
    /// Plan of the chosen duration.
    pub plan_id: PlanId,
    /// Chosen plan-price.
    pub plan_price_id: PlanPriceId,
    /// Plan length in months.
    pub duration_months: u16,

    /// Other durations the buyer may switch to.
    #[serde(default)]
    pub alternatives: PlanOptions,

    /// Optional dedication.
    #[serde(default)]
    pub dedication: Option<Dedication>,

    /// Planting site, when chosen.
    #[serde(default)]
    pub site_id: Option<SiteId>,
}

impl PlanLine {
    /// Looks up an alternative plan choice by plan-price id.
    pub fn alternative(&self, plan_price_id: PlanPriceId) -> Option<&PlanOption> {
        self.alternatives
            .iter()
            .find(|option| option.plan_price_id == plan_price_id)
    }
}

/// Kind-specific payload, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemDetails {
    /// Catalog product variant.
    Product(ProductLine),
    /// Tree sponsorship.
    Sponsorship(PlanLine),
    /// Tree adoption.
    Adoption(PlanLine),
}

impl ItemDetails {
    /// Returns the kind tag.
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Product(_) => ItemKind::Product,
            Self::Sponsorship(_) => ItemKind::Sponsorship,
            Self::Adoption(_) => ItemKind::Adoption,
        }
    }

    /// Returns the duplicate-combination key.
    pub const fn match_key(&self) -> MatchKey {
        match self {
            Self::Product(line) => MatchKey::Product(line.variant_id),
            Self::Sponsorship(line) => MatchKey::Sponsorship(line.subject_id, line.plan_price_id),
            Self::Adoption(line) => MatchKey::Adoption(line.subject_id, line.plan_price_id),
        }
    }

    /// Returns the plan payload for sponsorships and adoptions.
    pub const fn plan(&self) -> Option<&PlanLine> {
        match self {
            Self::Product(_) => None,
            Self::Sponsorship(line) | Self::Adoption(line) => Some(line),
        }
    }

    pub(crate) const fn plan_mut(&mut self) -> Option<&mut PlanLine> {
        match self {
            Self::Product(_) => None,
            Self::Sponsorship(line) | Self::Adoption(line) => Some(line),
        }
    }
}

/// Duplicate-combination key: at most one line item exists per key.
///
/// Products are discriminated by variant, plans by subject and plan-price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKey {
    /// Keyed by variant.
    Product(VariantId),
    /// Keyed by tree and plan-price.
    Sponsorship(SubjectId, PlanPriceId),
    /// Keyed by tree instance and plan-price.
    Adoption(SubjectId, PlanPriceId),
}

/// Normalized line item that has not been given an identity yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Number of units, at least 1.
    pub quantity: u32,
    /// Price of one unit.
    pub unit_price: Decimal,
    /// Presentational fields.
    pub display: ItemDisplay,

    /// Kind-specific payload.
    #[serde(flatten)]
    pub details: ItemDetails,
}

impl NewLineItem {
    /// Attaches an identity.
    #[must_use]
    pub fn with_id(self, id: impl Into<LineItemId>) -> LineItem {
        LineItem {
            id: id.into(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            display: self.display,
            details: self.details,
        }
    }

    /// Returns the duplicate-combination key.
    pub const fn match_key(&self) -> MatchKey {
        self.details.match_key()
    }
}

/// Canonical cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Temporary for guest items, server-assigned otherwise.
    pub id: LineItemId,
    /// Number of units, at least 1.
    pub quantity: u32,
    /// Price of one unit.
    pub unit_price: Decimal,
    /// Presentational fields.
    pub display: ItemDisplay,

    /// Kind-specific payload.
    #[serde(flatten)]
    pub details: ItemDetails,
}

impl LineItem {
    /// Returns the kind tag.
    pub const fn kind(&self) -> ItemKind {
        self.details.kind()
    }

    /// Returns the duplicate-combination key.
    pub const fn match_key(&self) -> MatchKey {
        self.details.match_key()
    }

    /// Rebuilds the add request that recreates this item on the backend.
    ///
    /// The item's identity is not part of the request.
    pub fn to_add_request(&self) -> AddItemRequest {
        match &self.details {
            ItemDetails::Product(line) => AddItemRequest::product(line.variant_id, self.quantity),
            ItemDetails::Sponsorship(line) | ItemDetails::Adoption(line) => AddItemRequest {
                kind: self.kind(),
                variant_id: None,
                subject_id: Some(line.subject_id),
                plan_price_id: Some(line.plan_price_id),
                quantity: self.quantity,
                dedication: line.dedication.clone(),
                site_id: line.site_id,
                images: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::ids::ServerItemId;

    use super::*;

    fn sponsorship() -> LineItem {
        NewLineItem {
            quantity: 2,
            unit_price: Decimal::new(1_500, 0),
            display: ItemDisplay {
                name: "Neem".to_string(),
                image: None,
            },
            details: ItemDetails::Sponsorship(PlanLine {
                subject_id: SubjectId::new(7),
                plan_id: PlanId::new(1),
                plan_price_id: PlanPriceId::new(11),
                duration_months: 12,
                alternatives: SmallVec::new(),
                dedication: Some(Dedication {
                    name: Some("Asha".to_string()),
                    ..Dedication::default()
                }),
                site_id: Some(SiteId::new(3)),
            }),
        }
        .with_id(ServerItemId::new(5))
    }

    #[test]
    fn match_key_switches_on_kind() {
        let item = sponsorship();

        assert_eq!(
            item.match_key(),
            MatchKey::Sponsorship(SubjectId::new(7), PlanPriceId::new(11))
        );

        let mut adoption = item.clone();
        adoption.details = match item.details {
            ItemDetails::Sponsorship(line) => ItemDetails::Adoption(line),
            other => other,
        };

        assert_ne!(adoption.match_key(), sponsorship().match_key());
    }

    #[test]
    fn add_request_carries_plan_fields_but_not_identity() {
        let request = sponsorship().to_add_request();

        assert_eq!(request.kind, ItemKind::Sponsorship);
        assert_eq!(request.subject_id, Some(SubjectId::new(7)));
        assert_eq!(request.plan_price_id, Some(PlanPriceId::new(11)));
        assert_eq!(request.quantity, 2);
        assert_eq!(request.site_id, Some(SiteId::new(3)));
        assert!(request.variant_id.is_none());
    }

    #[test]
    fn blank_dedication_is_empty() {
        let dedication = Dedication {
            name: Some("  ".to_string()),
            occasion: None,
            message: Some(String::new()),
        };

        assert!(dedication.is_empty());
        assert!(Dedication::default().is_empty());
    }

    #[test]
    fn kind_is_serialized_as_a_tag() -> TestResult {
        let json = serde_json::to_value(sponsorship())?;

        assert_eq!(json["kind"], "sponsorship");
        assert_eq!(json["id"]["server"], 5);
        assert_eq!(json["subject_id"], 7);

        let parsed: LineItem = serde_json::from_value(json)?;

        assert_eq!(parsed, sponsorship());

        Ok(())
    }
}
