//! Post operations.

use tracing::info;

use super::types::RestPost;
use super::{RestClient, rest_base};
use crate::error::WordPressError;
use crate::types::{PostPayload, RemotePost};

impl RestClient {
    /// Fetch every post of `post_type` regardless of status.
    pub(super) fn get_posts(&self, post_type: &str) -> Result<Vec<RemotePost>, WordPressError> {
        let posts: Vec<RestPost> = self.get_all(rest_base(post_type), "&status=any")?;
        Ok(posts.into_iter().map(RemotePost::from).collect())
    }

    pub(super) fn new_post(
        &self,
        post_type: &str,
        post: &PostPayload,
    ) -> Result<u64, WordPressError> {
        let url = format!("{}/{}", self.api_url(), rest_base(post_type));
        info!("Creating {} '{}'", post_type, post.slug);

        let created: RestPost = self.post_json(&url, &post_body(post))?;
        Ok(created.id)
    }

    pub(super) fn edit_post(
        &self,
        post_type: &str,
        id: u64,
        post: &PostPayload,
    ) -> Result<(), WordPressError> {
        let url = format!("{}/{}/{id}", self.api_url(), rest_base(post_type));
        info!("Updating {} {} '{}'", post_type, id, post.slug);

        let _: RestPost = self.post_json(&url, &post_body(post))?;
        Ok(())
    }

    /// Delete bypassing the trash.
    pub(super) fn remove_post(&self, post_type: &str, id: u64) -> Result<(), WordPressError> {
        let url = format!("{}/{}/{id}?force=true", self.api_url(), rest_base(post_type));
        info!("Deleting {} {}", post_type, id);

        self.delete(&url)
    }
}

/// Build the JSON body for create and update requests.
///
/// Custom fields go into `meta`, which only accepts keys registered on the site.
fn post_body(post: &PostPayload) -> serde_json::Value {
    let mut body = serde_json::json!({
        "title": post.title,
        "content": post.content,
        "slug": post.slug,
        "status": post.status,
    });

    if let Some(date) = &post.date {
        body["date"] = serde_json::json!(date);
    }
    if !post.tag_ids.is_empty() {
        body["tags"] = serde_json::json!(post.tag_ids);
    }
    if !post.custom_fields.is_empty() {
        let meta: serde_json::Map<String, serde_json::Value> = post
            .custom_fields
            .iter()
            .map(|field| (field.key.clone(), serde_json::json!(field.value)))
            .collect();
        body["meta"] = serde_json::Value::Object(meta);
    }

    body
}
