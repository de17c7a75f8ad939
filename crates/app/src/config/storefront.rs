//! Storefront Config

use clap::Args;

/// Storefront presentation and ordering settings.
#[derive(Debug, Args)]
pub struct StorefrontConfig {
    /// ISO 4217 currency used to display amounts
    #[arg(long, env = "GROVE_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Drop cart responses that arrive after a newer one was applied
    #[arg(long, env = "GROVE_DISCARD_STALE_RESPONSES", default_value_t = false)]
    pub discard_stale_responses: bool,
}
