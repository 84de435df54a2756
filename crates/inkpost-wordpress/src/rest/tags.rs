//! Tag operations.

use tracing::info;

use super::RestClient;
use super::types::RestTag;
use crate::error::WordPressError;
use crate::types::RemoteTag;

impl RestClient {
    pub(super) fn get_tags(&self) -> Result<Vec<RemoteTag>, WordPressError> {
        let tags: Vec<RestTag> = self.get_all("tags", "")?;
        Ok(tags.into_iter().map(RemoteTag::from).collect())
    }

    pub(super) fn new_tag(&self, name: &str) -> Result<RemoteTag, WordPressError> {
        let url = format!("{}/tags", self.api_url());
        info!("Creating tag '{}'", name);

        let tag: RestTag = self.post_json(&url, &serde_json::json!({ "name": name }))?;
        Ok(tag.into())
    }
}
