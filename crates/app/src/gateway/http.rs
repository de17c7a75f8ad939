//! HTTP cart gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};

use grove::{ids::ServerItemId, items::ItemPatch, requests::AddItemRequest};

use crate::{
    auth::BearerToken,
    gateway::{CartGateway, GatewayError, RemoteCart},
};

/// `reqwest` implementation of [`CartGateway`].
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    base_url: String,
    http: Client,
}

impl HttpCartGateway {
    /// Creates a gateway rooted at `base_url`, e.g. `"https://shop.example/api"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self::with_client(base_url, http))
    }

    /// Creates a gateway over an existing client.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        token: &BearerToken,
    ) -> Result<RemoteCart, GatewayError> {
        let response = request.bearer_auth(token.expose()).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!(operation, "cart request rejected the session");

            return Err(GatewayError::Unauthorized);
        }

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "cart request failed");

            return Err(GatewayError::backend(status.as_u16(), text));
        }

        debug!(operation, status = status.as_u16(), "cart request succeeded");

        // Some backends answer a clear with an empty body.
        if text.trim().is_empty() {
            return Ok(RemoteCart::default());
        }

        serde_json::from_str(&text).map_err(GatewayError::Decode)
    }
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    async fn fetch(&self, token: &BearerToken) -> Result<RemoteCart, GatewayError> {
        self.send("fetch", self.http.get(self.url("cart")), token)
            .await
    }

    async fn add(
        &self,
        token: &BearerToken,
        request: &AddItemRequest,
    ) -> Result<RemoteCart, GatewayError> {
        let builder = self.http.post(self.url("cart/items")).json(request);

        self.send("add", builder, token).await
    }

    async fn update(
        &self,
        token: &BearerToken,
        item: ServerItemId,
        patch: &ItemPatch,
    ) -> Result<RemoteCart, GatewayError> {
        let builder = self
            .http
            .put(self.url(&format!("cart/items/{item}")))
            .json(patch);

        self.send("update", builder, token).await
    }

    async fn remove(
        &self,
        token: &BearerToken,
        item: ServerItemId,
    ) -> Result<RemoteCart, GatewayError> {
        let builder = self.http.delete(self.url(&format!("cart/items/{item}")));

        self.send("remove", builder, token).await
    }

    async fn clear(&self, token: &BearerToken) -> Result<RemoteCart, GatewayError> {
        self.send("clear", self.http.delete(self.url("cart")), token)
            .await
    }
}
