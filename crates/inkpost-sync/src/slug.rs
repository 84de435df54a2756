//! Slug rules.
//!
//! A [`SlugRule`] pairs a human-readable description with a predicate that
//! returns `true` when the slug satisfies the rule.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static ALLOWED_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]*$").unwrap());

/// Description reported for a document without a slug.
pub const NO_SLUG: &str = "No slug";

/// Named slug predicate.
#[derive(Clone, Copy)]
pub struct SlugRule {
    /// Message reported when the rule is violated.
    pub description: &'static str,
    /// Returns `true` when the slug is acceptable.
    pub check: fn(&str) -> bool,
}

impl fmt::Debug for SlugRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlugRule")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Rules applied when the caller does not supply its own.
pub const DEFAULT_SLUG_RULES: &[SlugRule] = &[
    SlugRule {
        description: "Cannot start with `-` or `_`",
        check: |slug| !slug.starts_with(['-', '_']),
    },
    SlugRule {
        description: "Cannot end with `-` or `_`",
        check: |slug| !slug.ends_with(['-', '_']),
    },
    SlugRule {
        description: "Cannot contain consecutive `-`",
        check: |slug| !slug.contains("--"),
    },
    SlugRule {
        description: "Can only contain lowercase letters, digits, `-` and `_`",
        check: |slug| ALLOWED_CHARS_RE.is_match(slug),
    },
];

/// Check `slug` against every rule. A missing slug is never valid.
pub fn slug_valid(slug: Option<&str>, rules: &[SlugRule]) -> bool {
    slug.is_some_and(|slug| rules.iter().all(|rule| (rule.check)(slug)))
}

/// Descriptions of every rule `slug` violates, in rule order.
///
/// Returns `["No slug"]` when the slug is missing.
pub fn violated_slug_rules(slug: Option<&str>, rules: &[SlugRule]) -> Vec<String> {
    let Some(slug) = slug else {
        return vec![NO_SLUG.to_owned()];
    };

    rules
        .iter()
        .filter(|rule| !(rule.check)(slug))
        .map(|rule| rule.description.to_owned())
        .collect()
}
