//! Source records
//!
//! Catalog records the caller already holds when it asks for an item to be
//! added. Their display and price fields are copied onto the line item so the
//! cart renders without fetching them again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{PlanId, PlanPriceId, ProductId, SubjectId, VariantId};

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product id.
    pub id: ProductId,
    /// Product name.
    pub name: String,

    /// Thumbnail reference.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Purchasable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Variant id.
    pub id: VariantId,
    /// Parent product.
    pub product_id: ProductId,

    /// Variant name, when it differs from the product.
    #[serde(default)]
    pub name: Option<String>,

    /// Stock keeping unit.
    #[serde(default)]
    pub sku: Option<String>,

    /// List price.
    #[serde(default)]
    pub price: Option<Decimal>,

    /// Sale price, preferred over the list price.
    #[serde(default)]
    pub discounted_price: Option<Decimal>,

    /// Color option.
    #[serde(default)]
    pub color: Option<String>,

    /// Size option.
    #[serde(default)]
    pub size: Option<String>,

    /// Planter option.
    #[serde(default)]
    pub planter: Option<String>,
}

/// Tree or tree instance that can be sponsored or adopted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRecord {
    /// Tree or tree instance id.
    pub id: SubjectId,
    /// Tree name.
    pub name: String,

    /// Thumbnail reference.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Duration and price pairing offered for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPriceRecord {
    /// Plan-price id.
    pub id: PlanPriceId,
    /// Plan the price belongs to.
    pub plan_id: PlanId,
    /// Plan length in months.
    pub duration_months: u16,
    /// Price for the whole duration.
    pub price: Decimal,
}

/// Records accompanying an add request.
///
/// Products need `variant` (and usually `product`); sponsorships and
/// adoptions need `tree` and every plan-price offered for it, the selected one
/// included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSources {
    /// Product record, for products.
    #[serde(default)]
    pub product: Option<ProductRecord>,

    /// Variant record, for products.
    #[serde(default)]
    pub variant: Option<VariantRecord>,

    /// Tree record, for sponsorships and adoptions.
    #[serde(default)]
    pub tree: Option<TreeRecord>,

    /// Plan-prices offered for the tree.
    #[serde(default)]
    pub plan_prices: Vec<PlanPriceRecord>,
}

impl ItemSources {
    /// Sources for a product variant.
    #[must_use]
    pub fn product(product: Option<ProductRecord>, variant: VariantRecord) -> Self {
        Self {
            product,
            variant: Some(variant),
            ..Self::default()
        }
    }

    /// Sources for a sponsorship or adoption.
    #[must_use]
    pub fn plans(tree: TreeRecord, plan_prices: impl IntoIterator<Item = PlanPriceRecord>) -> Self {
        Self {
            tree: Some(tree),
            plan_prices: plan_prices.into_iter().collect(),
            ..Self::default()
        }
    }
}
