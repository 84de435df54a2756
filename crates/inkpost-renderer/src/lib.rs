//! Markdown document renderer for inkpost.
//!
//! This crate turns a Markdown document with a YAML front-matter header into a
//! [`Rendering`]: converted HTML, the document title, a flat attribute map and
//! a tag list derived from attribute conventions.
//!
//! # Document Format
//!
//! ```text
//! ---
//! slug: release-notes
//! tags: rust, tooling
//! public:
//! ---
//! # Release Notes
//!
//! ::include[shared/intro.md]
//! ```
//!
//! - Front-matter keys become attributes; null values act as presence flags
//!   and are dropped from [`Rendering::attributes`].
//! - `::include[path]` lines are replaced with the referenced file, resolved
//!   against the including document's directory.
//! - The leading H1 heading becomes the title unless a `title` attribute is set.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use inkpost_renderer::Renderer;
//!
//! let renderer = Renderer::new()
//!     .with_postprocessor(|html| html.replace("<hr />", ""));
//! let rendering = renderer.render(Path::new("docs/release-notes.md"))?;
//! assert_eq!(rendering.slug(), Some("release-notes"));
//! # Ok::<(), inkpost_renderer::RenderError>(())
//! ```

mod engine;
mod error;
mod front_matter;
mod include;
mod renderer;

pub use error::RenderError;
pub use renderer::{RenderOptions, Renderer, Rendering, TagTransform, TextTransform};
