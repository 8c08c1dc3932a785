//! CLI error types.

use oasig_config::ConfigError;
use oasig_core::SigningError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Signing(#[from] SigningError),
}
