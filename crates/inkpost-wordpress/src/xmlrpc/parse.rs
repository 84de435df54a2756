//! XML-RPC response decoding.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::value::Value;
use crate::error::WordPressError;

/// Element with its text content and child elements.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Decode a `methodResponse` document.
///
/// A `<fault>` response becomes [`WordPressError::Fault`].
pub(crate) fn decode_response(xml: &str) -> Result<Value, WordPressError> {
    let document = parse_tree(xml)?;
    let response = document
        .child("methodResponse")
        .ok_or_else(|| protocol("missing methodResponse"))?;

    if let Some(fault) = response.child("fault") {
        let value = decode_value(fault.child("value").ok_or_else(|| protocol("empty fault"))?)?;
        return Err(WordPressError::Fault {
            code: value.get("faultCode").and_then(Value::as_i64).unwrap_or_default(),
            message: value
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        });
    }

    let value = response
        .child("params")
        .and_then(|params| params.child("param"))
        .and_then(|param| param.child("value"))
        .ok_or_else(|| protocol("response has no value"))?;

    decode_value(value)
}

fn decode_value(element: &Element) -> Result<Value, WordPressError> {
    // Untyped values are strings.
    let Some(typed) = element.children.first() else {
        return Ok(Value::String(element.text.clone()));
    };

    let text = typed.text.trim();
    let value = match typed.name.as_str() {
        "int" | "i4" | "i8" => Value::Int(
            text.parse()
                .map_err(|_| protocol(&format!("invalid int '{text}'")))?,
        ),
        "boolean" => match text {
            "1" => Value::Bool(true),
            "0" => Value::Bool(false),
            other => return Err(protocol(&format!("invalid boolean '{other}'"))),
        },
        "string" => Value::String(typed.text.clone()),
        "double" => Value::Double(
            text.parse()
                .map_err(|_| protocol(&format!("invalid double '{text}'")))?,
        ),
        "dateTime.iso8601" => Value::DateTime(text.to_owned()),
        "base64" => Value::Base64(text.to_owned()),
        "nil" => Value::Nil,
        "array" => {
            let items = typed
                .child("data")
                .map(|data| {
                    data.children_named("value")
                        .map(decode_value)
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .unwrap_or_default();
            Value::Array(items)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children_named("member") {
                let name = member
                    .child("name")
                    .map(|n| n.text.clone())
                    .ok_or_else(|| protocol("struct member without name"))?;
                let value = match member.child("value") {
                    Some(v) => decode_value(v)?,
                    None => Value::Nil,
                };
                members.insert(name, value);
            }
            Value::Struct(members)
        }
        other => return Err(protocol(&format!("unknown value type '{other}'"))),
    };

    Ok(value)
}

fn protocol(message: &str) -> WordPressError {
    WordPressError::Protocol(message.to_owned())
}

/// Parse XML into an element tree rooted at a synthetic document node.
fn parse_tree(xml: &str) -> Result<Element, WordPressError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                stack.push(Element {
                    name,
                    ..Default::default()
                });
            }
            Event::Empty(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Element {
                        name,
                        ..Default::default()
                    });
                }
            }
            Event::End(_) => {
                if stack.len() > 1
                    && let Some(element) = stack.pop()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.children.push(element);
                }
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&decode_entity(&entity));
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }

    // Unclosed elements are folded into their parents.
    while stack.len() > 1 {
        if let Some(element) = stack.pop()
            && let Some(parent) = stack.last_mut()
        {
            parent.children.push(element);
        }
    }

    stack.pop().ok_or_else(|| protocol("empty document"))
}

/// Decode an entity reference name to its character.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn response(value: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse>\n  <params>\n    <param>\n      \
             <value>{value}</value>\n    </param>\n  </params>\n</methodResponse>\n"
        )
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(
            decode_response(&response("<int>42</int>")).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            decode_response(&response("<boolean>0</boolean>")).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            decode_response(&response("<string>a &amp; b</string>")).unwrap(),
            Value::String("a & b".to_owned())
        );
        assert_eq!(
            decode_response(&response("untyped &#233;")).unwrap(),
            Value::String("untyped \u{e9}".to_owned())
        );
    }

    #[test]
    fn test_decode_nested() {
        let xml = response(
            "<array><data>\n\
             <value><struct>\n\
               <member><name>post_id</name><value><string>7</string></value></member>\n\
               <member><name>post_name</name><value><string>hello</string></value></member>\n\
               <member><name>custom_fields</name><value><array><data></data></array></value></member>\n\
             </struct></value>\n\
             </data></array>",
        );
        let value = decode_response(&xml).unwrap();
        let posts = value.as_array().unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].get("post_id").and_then(Value::as_i64), Some(7));
        assert_eq!(posts[0].get("post_name").and_then(Value::as_str), Some("hello"));
        assert_eq!(
            posts[0].get("custom_fields").and_then(Value::as_array),
            Some(&[][..])
        );
    }

    #[test]
    fn test_decode_empty_string() {
        assert_eq!(
            decode_response(&response("<string></string>")).unwrap(),
            Value::String(String::new())
        );
        assert_eq!(
            decode_response(&response("<string/>")).unwrap(),
            Value::String(String::new())
        );
    }

    #[test]
    fn test_decode_fault() {
        let xml = "<methodResponse><fault><value><struct>\
                   <member><name>faultCode</name><value><int>403</int></value></member>\
                   <member><name>faultString</name><value><string>Incorrect username or password.</string></value></member>\
                   </struct></value></fault></methodResponse>";

        match decode_response(xml).unwrap_err() {
            WordPressError::Fault { code, message } => {
                assert_eq!(code, 403);
                assert_eq!(message, "Incorrect username or password.");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_response_is_protocol_error() {
        let err = decode_response("<html><body>Not here</body></html>").unwrap_err();
        assert!(matches!(err, WordPressError::Protocol(_)));
    }
}
