//! Cart domain errors.

use thiserror::Error;

use crate::{
    ids::{PlanPriceId, SubjectId, VariantId},
    items::{ItemKind, LineItemId},
};

/// Caller errors, raised before any storage or network work happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A product request arrived without a variant id.
    #[error("product requests require a variant id")]
    MissingVariantId,

    /// A sponsorship or adoption request arrived without a subject id.
    #[error("{0} requests require a subject id")]
    MissingSubjectId(ItemKind),

    /// A sponsorship or adoption request arrived without a plan-price id.
    #[error("{0} requests require a plan-price id")]
    MissingPlanPriceId(ItemKind),

    /// A required source record was not supplied.
    #[error("missing {0} record")]
    MissingSource(&'static str),

    /// The supplied variant record describes a different variant.
    #[error("variant record {found} does not match requested variant {expected}")]
    VariantMismatch {
        /// Requested variant.
        expected: VariantId,
        /// Variant described by the record.
        found: VariantId,
    },

    /// The supplied tree record describes a different subject.
    #[error("tree record {found} does not match requested subject {expected}")]
    SubjectMismatch {
        /// Requested subject.
        expected: SubjectId,
        /// Subject described by the record.
        found: SubjectId,
    },

    /// The plan-price is not offered for this subject.
    #[error("plan-price {0} is not available for this item")]
    UnknownPlanPrice(PlanPriceId),

    /// A field was supplied for an item kind it does not apply to.
    #[error("{field} does not apply to {kind} items")]
    NotApplicable {
        /// Offending field.
        field: &'static str,
        /// Kind of the item or request.
        kind: ItemKind,
    },

    /// An update carried no changes.
    #[error("update contains no changes")]
    EmptyPatch,
}

/// Errors raised by the guest-side cart table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalCartError {
    /// No item carries the given id.
    #[error("cart item {0} not found")]
    ItemNotFound(LineItemId),

    /// The requested change was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
