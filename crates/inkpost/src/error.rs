//! CLI error types.

use inkpost_config::ConfigError;
use inkpost_renderer::RenderError;
use inkpost_sync::{SyncError, VerifyError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("{0}")]
    Verify(#[from] VerifyError),

    #[error("invalid path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{0}")]
    Glob(#[from] glob::GlobError),

    #[error("{0}")]
    Validation(String),
}
