//! Application configuration
//!
//! Settings are read from command-line flags with environment fallbacks. The
//! binary flattens [`AppConfig`] into its own parser and loads `.env` first.

use std::{sync::Arc, time::Duration};

use clap::Args;
use rusty_money::iso;

use grove::pricing::{self, FormatError};

use crate::{
    auth::{AuthState, BearerToken},
    gateway::{GatewayError, HttpCartGateway},
    storage::{FileCartStorage, LocalCartStore},
    synchronizer::ResponseOrdering,
};

mod gateway;
mod logging;
mod storage;
mod storefront;

pub use gateway::GatewayConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use storage::StorageConfig;
pub use storefront::StorefrontConfig;

/// Grove cart configuration.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Backend cart API settings.
    #[command(flatten)]
    pub gateway: GatewayConfig,

    /// Guest cart persistence settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Storefront presentation and ordering settings.
    #[command(flatten)]
    pub storefront: StorefrontConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Builds the HTTP gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn http_gateway(&self) -> Result<HttpCartGateway, GatewayError> {
        HttpCartGateway::new(
            self.gateway.api_url.clone(),
            Duration::from_secs(self.gateway.timeout_seconds),
        )
    }

    /// Restores the guest cart from the configured directory.
    pub fn local_store(&self) -> LocalCartStore {
        LocalCartStore::load(Arc::new(FileCartStorage::new(&self.storage.cart_dir)))
    }

    /// Authentication state implied by the configured token.
    pub fn auth_state(&self) -> AuthState {
        AuthState::from_token(self.gateway.api_token.as_deref().map(BearerToken::new))
    }

    /// How concurrent cart responses are applied.
    pub fn ordering(&self) -> ResponseOrdering {
        if self.storefront.discard_stale_responses {
            ResponseOrdering::DiscardStale
        } else {
            ResponseOrdering::LastResponseWins
        }
    }

    /// Display currency.
    ///
    /// # Errors
    ///
    /// Returns an error for codes that are not ISO 4217.
    pub fn currency(&self) -> Result<&'static iso::Currency, FormatError> {
        pricing::currency(&self.storefront.currency)
    }
}
