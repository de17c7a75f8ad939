//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Guest cart persistence settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding the saved guest cart
    #[arg(long, env = "GROVE_CART_DIR", default_value = ".grove")]
    pub cart_dir: PathBuf,
}
