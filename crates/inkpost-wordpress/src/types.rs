//! Transport-independent post and tag types.

/// Custom field attached to a post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomField {
    /// Remote field id. Sending it back updates the field in place.
    pub id: Option<String>,
    /// Field key.
    pub key: String,
    /// Field value.
    pub value: String,
}

impl CustomField {
    /// Create a field without a remote id.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Post as stored on the remote site.
///
/// Only includes fields that are actually used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemotePost {
    /// Post id.
    pub id: u64,
    /// Post slug.
    pub slug: String,
    /// Post title.
    pub title: String,
    /// Post status.
    pub status: String,
    /// Custom fields. Empty when the transport does not expose them.
    pub custom_fields: Vec<CustomField>,
}

/// Tag term on the remote site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteTag {
    /// Term id.
    pub id: u64,
    /// Tag name.
    pub name: String,
}

/// Content sent when creating or updating a post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostPayload {
    /// Post title.
    pub title: String,
    /// HTML body.
    pub content: String,
    /// Post slug.
    pub slug: String,
    /// Post status (`draft`, `publish`, ...).
    pub status: String,
    /// Publication date (ISO 8601).
    pub date: Option<String>,
    /// Remote tag ids.
    pub tag_ids: Vec<u64>,
    /// Custom fields.
    pub custom_fields: Vec<CustomField>,
}
