//! WordPress XML-RPC client.
//!
//! Every call is a `POST` of a `methodCall` document to `/xmlrpc.php`, with the
//! blog id and credentials as the leading parameters.

mod parse;
mod value;

use std::time::Duration;

use tracing::{debug, info};
use ureq::Agent;

use self::parse::decode_response;
use self::value::{Value, encode_call};
use crate::backend::PostBackend;
use crate::error::WordPressError;
use crate::types::{CustomField, PostPayload, RemotePost, RemoteTag};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Posts requested per `wp.getPosts` call.
const PAGE_SIZE: i64 = 100;

/// Taxonomy holding post tags.
const TAG_TAXONOMY: &str = "post_tag";

/// WordPress XML-RPC client.
pub struct XmlRpcClient {
    agent: Agent,
    endpoint: String,
    blog_id: u32,
    username: String,
    password: String,
}

impl XmlRpcClient {
    /// Create a client for the site at `base_url`.
    pub fn new(base_url: &str, blog_id: u32, username: &str, password: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: format!("{}/xmlrpc.php", base_url.trim_end_matches('/')),
            blog_id,
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    /// Invoke `method` with the blog id and credentials prepended to `params`.
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, WordPressError> {
        let mut all = vec![
            Value::Int(i64::from(self.blog_id)),
            Value::from(self.username.as_str()),
            Value::from(self.password.as_str()),
        ];
        all.extend(params);

        debug!("XML-RPC call {}", method);

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "text/xml")
            .send(encode_call(method, &all).as_bytes())?;

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

        decode_response(&body.read_to_string()?)
    }

    /// Call a method whose result is a success flag.
    fn call_flag(&self, method: &str, params: Vec<Value>) -> Result<(), WordPressError> {
        match self.call(method, params)?.as_bool() {
            Some(true) => Ok(()),
            _ => Err(WordPressError::Rejected(method.to_owned())),
        }
    }
}

/// Read an id that WordPress may send as a string or an int.
fn id_field(record: &Value, key: &str) -> Result<u64, WordPressError> {
    record
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|id| u64::try_from(id).ok())
        .ok_or_else(|| WordPressError::Protocol(format!("missing or invalid '{key}'")))
}

fn string_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn post_from_record(record: &Value) -> Result<RemotePost, WordPressError> {
    let custom_fields = record
        .get("custom_fields")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .map(|field| CustomField {
            id: field.get("id").and_then(|id| match id {
                Value::Int(n) => Some(n.to_string()),
                other => other.as_str().map(str::to_owned),
            }),
            key: string_field(field, "key"),
            value: string_field(field, "value"),
        })
        .collect();

    Ok(RemotePost {
        id: id_field(record, "post_id")?,
        slug: string_field(record, "post_name"),
        title: string_field(record, "post_title"),
        status: string_field(record, "post_status"),
        custom_fields,
    })
}

/// Build the `content` struct for `wp.newPost` and `wp.editPost`.
fn post_content(post_type: &str, post: &PostPayload) -> Value {
    let mut members = vec![
        ("post_type", Value::from(post_type)),
        ("post_status", Value::from(post.status.as_str())),
        ("post_title", Value::from(post.title.as_str())),
        ("post_content", Value::from(post.content.as_str())),
        ("post_name", Value::from(post.slug.as_str())),
    ];

    if let Some(date) = &post.date {
        members.push(("post_date", Value::DateTime(iso8601(date))));
    }
    if !post.tag_ids.is_empty() {
        let ids = post
            .tag_ids
            .iter()
            .map(|id| Value::from(id.to_string()))
            .collect();
        members.push((
            "terms",
            Value::structure([(TAG_TAXONOMY, Value::Array(ids))]),
        ));
    }
    if !post.custom_fields.is_empty() {
        let fields = post
            .custom_fields
            .iter()
            .map(|field| {
                let mut entry = vec![
                    ("key", Value::from(field.key.as_str())),
                    ("value", Value::from(field.value.as_str())),
                ];
                if let Some(id) = &field.id {
                    entry.push(("id", Value::from(id.as_str())));
                }
                Value::structure(entry)
            })
            .collect();
        members.push(("custom_fields", Value::Array(fields)));
    }

    Value::structure(members)
}

/// Complete a bare date to a full timestamp.
fn iso8601(date: &str) -> String {
    if date.contains('T') {
        date.to_owned()
    } else {
        format!("{date}T00:00:00")
    }
}

impl PostBackend for XmlRpcClient {
    fn list_posts(&self, post_type: &str) -> Result<Vec<RemotePost>, WordPressError> {
        let mut posts = Vec::new();
        let mut offset = 0;

        loop {
            info!("Fetching {} posts from offset {}", post_type, offset);

            let filter = Value::structure([
                ("post_type", Value::from(post_type)),
                ("number", Value::Int(PAGE_SIZE)),
                ("offset", Value::Int(offset)),
            ]);
            let page = self.call("wp.getPosts", vec![filter])?;
            let records = page
                .as_array()
                .ok_or_else(|| WordPressError::Protocol("wp.getPosts returned no array".into()))?;

            if records.is_empty() {
                return Ok(posts);
            }
            for record in records {
                posts.push(post_from_record(record)?);
            }
            offset += PAGE_SIZE;
        }
    }

    fn list_tags(&self) -> Result<Vec<RemoteTag>, WordPressError> {
        info!("Fetching tags");

        let terms = self.call("wp.getTerms", vec![Value::from(TAG_TAXONOMY)])?;
        terms
            .as_array()
            .ok_or_else(|| WordPressError::Protocol("wp.getTerms returned no array".into()))?
            .iter()
            .map(|term| {
                Ok(RemoteTag {
                    id: id_field(term, "term_id")?,
                    name: string_field(term, "name"),
                })
            })
            .collect()
    }

    fn create_tag(&self, name: &str) -> Result<RemoteTag, WordPressError> {
        info!("Creating tag '{}'", name);

        let content = Value::structure([
            ("name", Value::from(name)),
            ("taxonomy", Value::from(TAG_TAXONOMY)),
        ]);
        let result = self.call("wp.newTerm", vec![content])?;
        let id = result
            .as_i64()
            .and_then(|id| u64::try_from(id).ok())
            .ok_or_else(|| WordPressError::Protocol("wp.newTerm returned no id".into()))?;

        Ok(RemoteTag {
            id,
            name: name.to_owned(),
        })
    }

    fn create_post(&self, post_type: &str, post: &PostPayload) -> Result<u64, WordPressError> {
        info!("Creating {} '{}'", post_type, post.slug);

        let result = self.call("wp.newPost", vec![post_content(post_type, post)])?;
        result
            .as_i64()
            .and_then(|id| u64::try_from(id).ok())
            .ok_or_else(|| WordPressError::Protocol("wp.newPost returned no id".into()))
    }

    fn update_post(
        &self,
        post_type: &str,
        id: u64,
        post: &PostPayload,
    ) -> Result<(), WordPressError> {
        info!("Updating {} {} '{}'", post_type, id, post.slug);

        self.call_flag(
            "wp.editPost",
            vec![Value::from(id.to_string()), post_content(post_type, post)],
        )
    }

    fn delete_post(&self, post_type: &str, id: u64) -> Result<(), WordPressError> {
        info!("Deleting {} {}", post_type, id);

        self.call_flag("wp.deletePost", vec![Value::from(id.to_string())])
    }
}
