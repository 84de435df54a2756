//! WordPress REST API client.
//!
//! Provides a sync HTTP client for the `/wp-json/wp/v2` resource API with
//! application-password basic authentication.

mod posts;
mod tags;
mod types;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use tracing::info;
use ureq::Agent;

use crate::backend::PostBackend;
use crate::error::WordPressError;
use crate::types::{PostPayload, RemotePost, RemoteTag};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Items requested per page when enumerating a collection.
const PER_PAGE: u32 = 100;

/// Response header carrying the number of pages in a collection.
const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// WordPress REST API client.
pub struct RestClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl RestClient {
    /// Create a client for the site at `base_url`.
    ///
    /// `password` is an application password for `username`.
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = STANDARD.encode(format!("{username}:{password}"));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {credentials}"),
        }
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/wp-json/wp/v2", self.base_url)
    }

    /// Fetch every item of a collection, following `X-WP-TotalPages`.
    ///
    /// `filter` is appended to the query string (e.g. `&status=any`).
    fn get_all<T: DeserializeOwned>(
        &self,
        resource: &str,
        filter: &str,
    ) -> Result<Vec<T>, WordPressError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/{resource}?per_page={PER_PAGE}&page={page}&context=edit{filter}",
                self.api_url()
            );

            info!("Fetching {} page {}", resource, page);

            let response = self
                .agent
                .get(&url)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json")
                .call()?;

            let total_pages = response
                .headers()
                .get(TOTAL_PAGES_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(1);

            let batch: Vec<T> = check_status(response)?.read_json()?;
            items.extend(batch);

            if page >= total_pages {
                return Ok(items);
            }
            page += 1;
        }
    }

    /// POST a JSON body and decode the JSON response.
    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, WordPressError> {
        let payload_bytes = serde_json::to_vec(payload)?;

        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        Ok(check_status(response)?.read_json()?)
    }

    /// Send a DELETE request, discarding the response body.
    fn delete(&self, url: &str) -> Result<(), WordPressError> {
        let response = self
            .agent
            .delete(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        check_status(response)?;
        Ok(())
    }
}

/// Turn an error status into [`WordPressError::Http`], returning the body otherwise.
fn check_status(
    response: ureq::http::Response<ureq::Body>,
) -> Result<ureq::Body, WordPressError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(WordPressError::Http {
            status,
            body: error_body,
        });
    }

    Ok(body)
}

/// Map a post type to its REST collection name.
fn rest_base(post_type: &str) -> &str {
    match post_type {
        "post" => "posts",
        "page" => "pages",
        other => other,
    }
}

impl PostBackend for RestClient {
    fn list_posts(&self, post_type: &str) -> Result<Vec<RemotePost>, WordPressError> {
        self.get_posts(post_type)
    }

    fn list_tags(&self) -> Result<Vec<RemoteTag>, WordPressError> {
        self.get_tags()
    }

    fn create_tag(&self, name: &str) -> Result<RemoteTag, WordPressError> {
        self.new_tag(name)
    }

    fn create_post(&self, post_type: &str, post: &PostPayload) -> Result<u64, WordPressError> {
        self.new_post(post_type, post)
    }

    fn update_post(
        &self,
        post_type: &str,
        id: u64,
        post: &PostPayload,
    ) -> Result<(), WordPressError> {
        self.edit_post(post_type, id, post)
    }

    fn delete_post(&self, post_type: &str, id: u64) -> Result<(), WordPressError> {
        self.remove_post(post_type, id)
    }
}
