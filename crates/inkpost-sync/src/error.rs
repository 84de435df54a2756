//! Error types for synchronization and verification.

use inkpost_renderer::RenderError;
use inkpost_wordpress::WordPressError;

use crate::verify::SlugViolation;

/// Error that aborts a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A document could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A remote call failed. Work done before the failure is not rolled back.
    #[error("remote error: {0}")]
    Remote(#[from] WordPressError),
}

/// Error from the pre-flight slug check.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// One or more documents have a missing or invalid slug.
    #[error("{} document(s) have invalid slugs", .0.len())]
    InvalidSlugs(Vec<SlugViolation>),

    /// A document could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
}
