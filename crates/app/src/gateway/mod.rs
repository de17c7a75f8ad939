//! Remote Cart Gateway
//!
//! Thin request layer over the backend's cart endpoints. Every call returns
//! the backend's full cart snapshot; there is no retry and no local fallback.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grove::{
    cart::Cart,
    ids::ServerItemId,
    items::{ItemDetails, ItemDisplay, ItemPatch, LineItem, LineItemId},
    requests::AddItemRequest,
};

use crate::auth::BearerToken;

mod errors;
mod http;

pub use errors::GatewayError;
pub use http::HttpCartGateway;

/// Cart item as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCartItem {
    /// Server-assigned item id.
    pub id: ServerItemId,
    /// Quantity held by the backend.
    pub quantity: u32,
    /// Price of one unit.
    pub unit_price: Decimal,
    /// Display name.
    pub name: String,

    /// Image reference, if any.
    #[serde(default)]
    pub image: Option<String>,

    /// Kind-specific payload.
    #[serde(flatten)]
    pub details: ItemDetails,
}

impl From<RemoteCartItem> for LineItem {
    fn from(item: RemoteCartItem) -> Self {
        Self {
            id: LineItemId::Server(item.id),
            quantity: item.quantity.max(1),
            unit_price: item.unit_price,
            display: ItemDisplay {
                name: item.name,
                image: item.image,
            },
            details: item.details,
        }
    }
}

/// Full cart snapshot as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCart {
    /// Items in backend order.
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
}

impl RemoteCart {
    /// Rebuilds the server-derived cart, preserving the backend's order.
    pub fn into_cart(self) -> Cart {
        Cart::server(self.items.into_iter().map(LineItem::from).collect::<Vec<_>>())
    }
}

/// Backend cart API. Each call is authenticated with the visitor's token.
#[automock]
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// `GET cart`
    async fn fetch(&self, token: &BearerToken) -> Result<RemoteCart, GatewayError>;

    /// `POST cart/items`
    async fn add(
        &self,
        token: &BearerToken,
        request: &AddItemRequest,
    ) -> Result<RemoteCart, GatewayError>;

    /// `PUT cart/items/{id}`
    async fn update(
        &self,
        token: &BearerToken,
        item: ServerItemId,
        patch: &ItemPatch,
    ) -> Result<RemoteCart, GatewayError>;

    /// `DELETE cart/items/{id}`
    async fn remove(
        &self,
        token: &BearerToken,
        item: ServerItemId,
    ) -> Result<RemoteCart, GatewayError>;

    /// `DELETE cart`
    async fn clear(&self, token: &BearerToken) -> Result<RemoteCart, GatewayError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use grove::{cart::CartSource, items::ItemKind};

    use super::*;

    #[test]
    fn snapshot_decodes_into_server_cart() -> TestResult {
        let snapshot: RemoteCart = serde_json::from_value(json!({
            "items": [
                {
                    "id": 42,
                    "kind": "product",
                    "quantity": 3,
                    "unit_price": "100.00",
                    "name": "Planter",
                    "variant_id": 1,
                    "sku": "PLT-1"
                },
                {
                    "id": 43,
                    "kind": "adoption",
                    "quantity": 0,
                    "unit_price": 1200,
                    "name": "Mango #9",
                    "image": "mango.png",
                    "subject_id": 9,
                    "plan_id": 2,
                    "plan_price_id": 20,
                    "duration_months": 12
                }
            ]
        }))?;

        let cart = snapshot.into_cart();

        assert_eq!(cart.source(), CartSource::Server);
        assert_eq!(cart.len(), 2);

        let kinds: Vec<ItemKind> = cart.items().iter().map(LineItem::kind).collect();
        assert_eq!(kinds, [ItemKind::Product, ItemKind::Adoption]);

        let ids: Vec<Option<ServerItemId>> =
            cart.items().iter().map(|item| item.id.server()).collect();
        assert_eq!(
            ids,
            [Some(ServerItemId::new(42)), Some(ServerItemId::new(43))]
        );

        assert_eq!(cart.items().last().map(|item| item.quantity), Some(1));
        assert_eq!(cart.subtotal(), Decimal::new(1_500, 0));

        Ok(())
    }

    #[test]
    fn missing_items_decode_as_empty_cart() -> TestResult {
        let snapshot: RemoteCart = serde_json::from_value(json!({}))?;

        assert!(snapshot.into_cart().is_empty());

        Ok(())
    }
}
