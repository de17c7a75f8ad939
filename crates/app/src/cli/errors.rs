use std::{io, path::PathBuf};

use grove::pricing::FormatError;
use grove_app::{gateway::GatewayError, synchronizer::CartError};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("invalid currency: {0}")]
    Currency(#[from] FormatError),

    #[error("failed to build cart client: {0}")]
    Client(#[from] GatewayError),

    #[error("failed to read sources file {}: {source}", .path.display())]
    ReadSources { path: PathBuf, source: io::Error },

    #[error("invalid sources file {}: {source}", .path.display())]
    ParseSources {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("sync requires a token (--api-token or GROVE_API_TOKEN)")]
    MissingToken,

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
