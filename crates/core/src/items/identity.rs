//! Line item identity.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ids::ServerItemId;

const TEMPORARY_PREFIX: &str = "tmp-";

/// Client-generated id for an item that the backend has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemporaryId(Uuid);

impl TemporaryId {
    /// Generates a fresh, time-ordered temporary id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for TemporaryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TemporaryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{TEMPORARY_PREFIX}{}", self.0)
    }
}

/// Identity of a line item. Exactly one scheme is authoritative at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemId {
    /// Assigned by the backend.
    Server(ServerItemId),

    /// Assigned locally while the cart is guest-only.
    Temporary(TemporaryId),
}

impl LineItemId {
    /// Returns the server id, if this item has been persisted.
    #[must_use]
    pub const fn server(self) -> Option<ServerItemId> {
        match self {
            Self::Server(id) => Some(id),
            Self::Temporary(_) => None,
        }
    }

    /// Returns `true` for locally generated ids.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

impl From<ServerItemId> for LineItemId {
    fn from(id: ServerItemId) -> Self {
        Self::Server(id)
    }
}

impl From<TemporaryId> for LineItemId {
    fn from(id: TemporaryId) -> Self {
        Self::Temporary(id)
    }
}

impl Display for LineItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Server(id) => Display::fmt(id, f),
            Self::Temporary(id) => Display::fmt(id, f),
        }
    }
}

/// Error parsing a [`LineItemId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cart item id: {0}")]
pub struct ParseLineItemIdError(String);

impl FromStr for LineItemId {
    type Err = ParseLineItemIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseLineItemIdError(value.to_string());

        if let Some(uuid) = value.strip_prefix(TEMPORARY_PREFIX) {
            return Uuid::parse_str(uuid)
                .map(|uuid| Self::Temporary(TemporaryId::from_uuid(uuid)))
                .map_err(|_source| invalid());
        }

        value
            .parse::<u64>()
            .map(|id| Self::Server(ServerItemId::new(id)))
            .map_err(|_source| invalid())
    }
}
