//! Grove prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartSource},
    errors::{LocalCartError, ValidationError},
    ids::{PlanId, PlanPriceId, ProductId, ServerItemId, SiteId, SubjectId, VariantId},
    items::{
        Dedication, ItemDetails, ItemDisplay, ItemKind, ItemPatch, LineItem, LineItemId, MatchKey,
        NewLineItem, PlanLine, PlanOption, ProductLine, TemporaryId, VariantSelections,
    },
    local::LocalCart,
    normalizer::normalize,
    pricing::{format_amount, total_price},
    requests::{AddItemRequest, ItemTarget},
    sources::{ItemSources, PlanPriceRecord, ProductRecord, TreeRecord, VariantRecord},
};
