//! WordPress integration for inkpost.
//!
//! This crate provides the remote side of synchronization:
//! - [`PostBackend`]: the operations the syncer needs from a remote site
//! - [`RestClient`]: JSON resource API (`/wp-json/wp/v2`) with basic auth
//! - [`XmlRpcClient`]: procedural API (`/xmlrpc.php`)
//!
//! # Example
//!
//! ```no_run
//! use inkpost_wordpress::{PostBackend, RestClient};
//!
//! let client = RestClient::new("https://blog.example.com", "editor", "app-password");
//! for post in client.list_posts("post")? {
//!     println!("{} -> {}", post.slug, post.id);
//! }
//! # Ok::<(), inkpost_wordpress::WordPressError>(())
//! ```

mod backend;
mod rest;
mod types;
mod xmlrpc;

pub mod error;

pub use backend::PostBackend;
pub use error::WordPressError;
pub use rest::RestClient;
pub use types::{CustomField, PostPayload, RemotePost, RemoteTag};
pub use xmlrpc::XmlRpcClient;
