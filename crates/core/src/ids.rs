//! Identifiers
//!
//! Backend entities are addressed by integer ids. Each entity gets its own
//! newtype so a variant id can never be passed where a plan-price id is
//! expected.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::ParseIntError,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw backend id.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw backend id.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.parse().map(Self)
            }
        }
    };
}

numeric_id! {
    /// Catalog product.
    ProductId
}

numeric_id! {
    /// Purchasable variant of a catalog product.
    VariantId
}

numeric_id! {
    /// Sponsorship or adoption subject: a tree, or a tree instance.
    SubjectId
}

numeric_id! {
    /// Sponsorship or adoption plan.
    PlanId
}

numeric_id! {
    /// Duration and price pairing attached to a plan.
    PlanPriceId
}

numeric_id! {
    /// Planting site.
    SiteId
}

numeric_id! {
    /// Cart item id assigned by the backend once persisted.
    ServerItemId
}
