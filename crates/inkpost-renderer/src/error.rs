//! Error types for document rendering.

use std::path::PathBuf;

/// Error returned when a document cannot be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Front-matter header is not a valid YAML mapping.
    #[error("invalid front matter in {}: {message}", .path.display())]
    FrontMatter {
        /// Document path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}
