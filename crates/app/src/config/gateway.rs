//! Gateway Config

use clap::Args;

/// Backend cart API settings.
#[derive(Debug, Args)]
pub struct GatewayConfig {
    /// Base URL of the cart API
    #[arg(long, env = "GROVE_API_URL", default_value = "http://localhost:8000/api")]
    pub api_url: String,

    /// Bearer token of the signed-in visitor; absent for guests
    #[arg(long, env = "GROVE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "GROVE_API_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub timeout_seconds: u64,
}
