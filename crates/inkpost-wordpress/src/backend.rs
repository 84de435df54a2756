//! Remote backend abstraction.

use crate::error::WordPressError;
use crate::types::{PostPayload, RemotePost, RemoteTag};

/// Operations the syncer needs from a remote site.
///
/// Implemented by [`RestClient`](crate::RestClient) and
/// [`XmlRpcClient`](crate::XmlRpcClient). Every call blocks until the remote
/// responds; a non-success response is returned as an error.
pub trait PostBackend {
    /// Fetch every post of `post_type`, following pagination.
    fn list_posts(&self, post_type: &str) -> Result<Vec<RemotePost>, WordPressError>;

    /// Fetch every tag, following pagination.
    fn list_tags(&self) -> Result<Vec<RemoteTag>, WordPressError>;

    /// Create a tag named `name`.
    fn create_tag(&self, name: &str) -> Result<RemoteTag, WordPressError>;

    /// Create a post and return its id.
    fn create_post(&self, post_type: &str, post: &PostPayload) -> Result<u64, WordPressError>;

    /// Replace the content of post `id`.
    fn update_post(
        &self,
        post_type: &str,
        id: u64,
        post: &PostPayload,
    ) -> Result<(), WordPressError>;

    /// Delete post `id`.
    fn delete_post(&self, post_type: &str, id: u64) -> Result<(), WordPressError>;
}
