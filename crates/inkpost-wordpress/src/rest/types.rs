//! REST API wire types.

use serde::Deserialize;

use crate::types::{CustomField, RemotePost, RemoteTag};

/// Post resource.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RestPost {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: RenderedField,
    /// Registered meta. The API sends `[]` instead of `{}` when empty.
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Field exposed as raw and rendered variants.
///
/// `raw` is only present with `context=edit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RenderedField {
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub rendered: String,
}

/// Tag resource.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RestTag {
    pub id: u64,
    pub name: String,
}

impl From<RestPost> for RemotePost {
    fn from(post: RestPost) -> Self {
        let mut custom_fields: Vec<CustomField> = match post.meta {
            serde_json::Value::Object(meta) => meta
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    CustomField::new(key, value)
                })
                .collect(),
            _ => Vec::new(),
        };
        custom_fields.sort_by(|a, b| a.key.cmp(&b.key));

        Self {
            id: post.id,
            slug: post.slug,
            title: post.title.raw.unwrap_or(post.title.rendered),
            status: post.status,
            custom_fields,
        }
    }
}

impl From<RestTag> for RemoteTag {
    fn from(tag: RestTag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_post_with_meta_object() {
        let post: RestPost = serde_json::from_str(
            r#"{"id": 7, "slug": "hello", "status": "draft",
                "title": {"raw": "Hello", "rendered": "Hello &amp; more"},
                "meta": {"source": "docs", "count": 2}}"#,
        )
        .unwrap();
        let post = RemotePost::from(post);

        assert_eq!(post.id, 7);
        assert_eq!(post.slug, "hello");
        assert_eq!(post.title, "Hello");
        assert_eq!(
            post.custom_fields,
            vec![CustomField::new("count", "2"), CustomField::new("source", "docs")]
        );
    }

    #[test]
    fn test_post_with_empty_meta_array() {
        let post: RestPost =
            serde_json::from_str(r#"{"id": 1, "slug": "a", "title": {"rendered": "A"}, "meta": []}"#)
                .unwrap();
        let post = RemotePost::from(post);

        assert_eq!(post.title, "A");
        assert!(post.custom_fields.is_empty());
    }
}
