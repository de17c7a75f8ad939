//! Item normalizer
//!
//! Turns an add request and the caller's source records into one canonical
//! line item. The transform is pure: it generates no ids and performs no I/O,
//! so a failed add can be retried with the same input and yield an equal item.

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::warn;

use crate::{
    errors::ValidationError,
    ids::{PlanPriceId, SubjectId, VariantId},
    items::{
        ItemDetails, ItemDisplay, NewLineItem, PlanLine, PlanOption, PlanOptions, ProductLine,
        VariantSelections,
    },
    requests::{AddItemRequest, ItemTarget},
    sources::{ItemSources, PlanPriceRecord, TreeRecord, VariantRecord},
};

/// Normalizes an add request into a line item without an identity.
///
/// # Errors
///
/// - Any error from [`AddItemRequest::target`].
/// - [`ValidationError::MissingSource`]: the variant or tree record is absent.
/// - [`ValidationError::VariantMismatch`] / [`ValidationError::SubjectMismatch`]:
///   the record describes a different entity.
/// - [`ValidationError::UnknownPlanPrice`]: the selected plan-price is not
///   among the supplied plan-price records.
pub fn normalize(
    request: &AddItemRequest,
    sources: &ItemSources,
) -> Result<NewLineItem, ValidationError> {
    match request.target()? {
        ItemTarget::Product { variant_id } => normalize_product(request, sources, variant_id),
        ItemTarget::Sponsorship {
            subject_id,
            plan_price_id,
        } => normalize_plan(
            request,
            sources,
            subject_id,
            plan_price_id,
            ItemDetails::Sponsorship,
        ),
        ItemTarget::Adoption {
            subject_id,
            plan_price_id,
        } => normalize_plan(
            request,
            sources,
            subject_id,
            plan_price_id,
            ItemDetails::Adoption,
        ),
    }
}

fn normalize_product(
    request: &AddItemRequest,
    sources: &ItemSources,
    variant_id: VariantId,
) -> Result<NewLineItem, ValidationError> {
    let variant = sources
        .variant
        .as_ref()
        .ok_or(ValidationError::MissingSource("variant"))?;

    if variant.id != variant_id {
        return Err(ValidationError::VariantMismatch {
            expected: variant_id,
            found: variant.id,
        });
    }

    let product = sources.product.as_ref();

    let name = product
        .map(|product| product.name.clone())
        .or_else(|| variant.name.clone())
        .unwrap_or_else(|| format!("Variant {variant_id}"));

    let thumbnail = product.and_then(|product| product.thumbnail.as_deref());

    Ok(NewLineItem {
        quantity: request.effective_quantity(),
        unit_price: variant_price(variant),
        display: ItemDisplay {
            name,
            image: resolve_image(request, thumbnail),
        },
        details: ItemDetails::Product(ProductLine {
            variant_id,
            product_id: Some(variant.product_id),
            sku: variant.sku.clone(),
            selections: VariantSelections {
                color: variant.color.clone(),
                size: variant.size.clone(),
                planter: variant.planter.clone(),
            },
        }),
    })
}

fn normalize_plan(
    request: &AddItemRequest,
    sources: &ItemSources,
    subject_id: SubjectId,
    plan_price_id: PlanPriceId,
    details: fn(PlanLine) -> ItemDetails,
) -> Result<NewLineItem, ValidationError> {
    let tree: &TreeRecord = sources
        .tree
        .as_ref()
        .ok_or(ValidationError::MissingSource("tree"))?;

    if tree.id != subject_id {
        return Err(ValidationError::SubjectMismatch {
            expected: subject_id,
            found: tree.id,
        });
    }

    let selected: &PlanPriceRecord = sources
        .plan_prices
        .iter()
        .find(|record| record.id == plan_price_id)
        .ok_or(ValidationError::UnknownPlanPrice(plan_price_id))?;

    let line = PlanLine {
        subject_id,
        plan_id: selected.plan_id,
        plan_price_id,
        duration_months: selected.duration_months,
        alternatives: alternatives(&sources.plan_prices),
        dedication: request
            .dedication
            .clone()
            .filter(|dedication| !dedication.is_empty()),
        site_id: request.site_id,
    };

    Ok(NewLineItem {
        quantity: request.effective_quantity(),
        unit_price: selected.price,
        display: ItemDisplay {
            name: tree.name.clone(),
            image: resolve_image(request, tree.thumbnail.as_deref()),
        },
        details: details(line),
    })
}

/// Discounted price, then list price, then zero.
///
/// A missing price is a catalog anomaly, not a reason to refuse the item: the
/// cart still has to render.
fn variant_price(variant: &VariantRecord) -> Decimal {
    let non_negative = |price: &Decimal| !price.is_sign_negative();

    variant
        .discounted_price
        .filter(non_negative)
        .or_else(|| variant.price.filter(non_negative))
        .unwrap_or_else(|| {
            warn!(variant = %variant.id, "variant has no usable price; defaulting to zero");

            Decimal::ZERO
        })
}

/// Request images, then the source thumbnail, then none.
fn resolve_image(request: &AddItemRequest, thumbnail: Option<&str>) -> Option<String> {
    request
        .images
        .iter()
        .find(|image| !image.trim().is_empty())
        .map(String::as_str)
        .or(thumbnail)
        .map(str::to_string)
}

fn alternatives(records: &[PlanPriceRecord]) -> PlanOptions {
    let mut options: PlanOptions = records
        .iter()
        .map(|record| PlanOption {
            plan_price_id: record.id,
            plan_id: record.plan_id,
            duration_months: record.duration_months,
            price: record.price,
        })
        .collect::<SmallVec<_>>();

    options.sort_by_key(|option| (option.duration_months, option.plan_price_id));

    options
}
