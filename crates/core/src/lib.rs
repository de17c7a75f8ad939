//! Grove
//!
//! Cart domain for the Grove storefront: line items covering product variants,
//! tree sponsorships and tree adoptions, the normalizer that builds them from
//! add requests, and the guest-side cart table.

pub mod cart;
pub mod errors;
pub mod ids;
pub mod items;
pub mod local;
pub mod normalizer;
pub mod prelude;
pub mod pricing;
pub mod requests;
pub mod sources;

pub use errors::{LocalCartError, ValidationError};
