//! YAML front-matter header parsing.
//!
//! The header is delimited by `---` lines at the very start of the document.
//! It is closed by either `---` or `...`.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// Parsed header values. `None` marks a key that is present with a null value.
pub(crate) type HeaderValues = BTreeMap<String, Option<String>>;

/// Split a document into its front-matter header and body.
///
/// Returns `(None, text)` when the document has no header.
pub(crate) fn split(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    // Unterminated header: treat the whole document as body.
    (None, text)
}

/// Parse a header into flat string values.
///
/// Scalars become strings, sequences are joined with `", "`, nested mappings
/// are JSON-encoded. Null values are kept as `None`.
pub(crate) fn parse(header: &str) -> Result<HeaderValues, String> {
    if header.trim().is_empty() {
        return Ok(HeaderValues::new());
    }

    let value: Value = serde_yaml::from_str(header).map_err(|e| e.to_string())?;

    let mapping = match value {
        Value::Null => return Ok(HeaderValues::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err("front matter must be a mapping".to_owned()),
    };

    let mut values = HeaderValues::new();
    for (key, value) in &mapping {
        let Some(key) = flatten(key) else {
            continue;
        };
        values.insert(key, flatten(value));
    }
    Ok(values)
}

fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(items) => Some(
            items
                .iter()
                .filter_map(flatten)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Mapping(_) => serde_json::to_string(value).ok(),
        Value::Tagged(tagged) => flatten(&tagged.value),
    }
}
