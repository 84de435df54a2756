//! Synchronization of rendered documents to a remote post collection.
//!
//! - [`Syncer`]: reconciles a set of documents against the posts of one post
//!   type, creating, updating and optionally deleting remote posts by slug
//! - [`slug`]: named slug rules and the checks built on them
//! - [`verify_slugs`]: pre-flight check that every document has a valid slug
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use inkpost_renderer::Renderer;
//! use inkpost_sync::{SyncOptions, Syncer, slug::DEFAULT_SLUG_RULES, verify_slugs};
//! use inkpost_wordpress::RestClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = vec![PathBuf::from("docs/intro.md")];
//! let renderer = Renderer::new();
//! verify_slugs(&renderer, &paths, DEFAULT_SLUG_RULES)?;
//!
//! let client = RestClient::new("https://blog.example.com", "editor", "app-password");
//! let mut syncer = Syncer::new(Box::new(client), "post", renderer, SyncOptions::default())?;
//! let report = syncer.sync(&paths, &[])?;
//! println!("{} posts synced", report.processed.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod report;
mod syncer;
mod verify;

pub mod slug;

#[cfg(test)]
mod testing;

pub use error::{SyncError, VerifyError};
pub use report::{SyncPlan, SyncReport};
pub use syncer::{DEFAULT_ATTRIBUTES_FIELD, DocumentFilter, SyncOptions, Syncer};
pub use verify::{SlugViolation, verify_slugs};
