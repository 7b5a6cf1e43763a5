//! Request bodies.
//!
//! A request carries at most one [`Body`]: either a [`Form`] or a [`Json`]
//! object, chosen through a [`BodySelector`]. The selector is consumed by
//! the choice, so one body block can never declare both. Assembly renders
//! the body into a [`Payload`] with its content type.

use crate::error::Error;
use crate::value::Value;
use bytes::Bytes;
use serde::ser::SerializeMap;

/// Content type of a form payload.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// Content type of a JSON payload.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Which encoder produced a [`Payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `application/x-www-form-urlencoded`.
    Form,
    /// `application/json`.
    Json,
}

impl BodyKind {
    /// The content type implied by this kind.
    pub fn content_type(self) -> &'static str {
        match self {
            BodyKind::Form => FORM_CONTENT_TYPE,
            BodyKind::Json => JSON_CONTENT_TYPE,
        }
    }
}

/// A declared request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Form fields, rendered as `application/x-www-form-urlencoded`.
    Form(Form),
    /// A flat JSON object of string values.
    Json(Json),
}

impl Body {
    /// The kind of payload this body renders to.
    pub fn kind(&self) -> BodyKind {
        match self {
            Body::Form(_) => BodyKind::Form,
            Body::Json(_) => BodyKind::Json,
        }
    }

    /// Render the body.
    pub fn encode(&self) -> Result<Payload, Error> {
        let text = match self {
            Body::Form(form) => form.encode(),
            Body::Json(json) => json.encode()?,
        };
        Ok(Payload {
            kind: self.kind(),
            bytes: Bytes::from(text),
        })
    }
}

/// Chooses the body variant. Passed to the closure given to
/// [`RequestContext::body`](crate::RequestContext::body).
#[derive(Debug)]
pub struct BodySelector {
    _private: (),
}

impl BodySelector {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    /// Declare a form body.
    pub fn form<F>(self, f: F) -> Body
    where
        F: FnOnce(&mut Form),
    {
        let mut form = Form::default();
        f(&mut form);
        Body::Form(form)
    }

    /// Declare a JSON body.
    pub fn json<F>(self, f: F) -> Body
    where
        F: FnOnce(&mut Json),
    {
        let mut json = Json::default();
        f(&mut json);
        Body::Json(json)
    }
}

/// Ordered form fields. Repeated names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    /// Append a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.push((name.into(), value.into().into_string()));
        self
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn encode(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.fields {
            ser.append_pair(name, value);
        }
        ser.finish()
    }
}

/// Ordered members of a flat JSON object.
///
/// Adding a name that already exists replaces its value in place, since a
/// JSON object cannot hold duplicate members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json {
    members: Vec<(String, String)>,
}

impl Json {
    /// Set a member.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into().into_string();
        match self.members.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.members.push((name, value)),
        }
        self
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn encode(&self) -> Result<String, Error> {
        serde_json::to_string(self)
            .map_err(|e| Error::body("JSON serialization failed").with_source(e))
    }
}

// `serde_json::Map` sorts keys unless `preserve_order` is enabled, so the
// object is streamed through `SerializeMap` to keep declaration order.
impl serde::Serialize for Json {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.members.len()))?;
        for (k, v) in &self.members {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A rendered body, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    kind: BodyKind,
    bytes: Bytes,
}

impl Payload {
    /// Which encoder produced this payload.
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// The implied `Content-Type`.
    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The payload as text. Both encoders produce UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Consume into the payload bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Body {
        BodySelector::new().form(|f| {
            for &(k, v) in pairs {
                f.add(k, v);
            }
        })
    }

    fn json(pairs: &[(&str, &str)]) -> Body {
        BodySelector::new().json(|j| {
            for &(k, v) in pairs {
                j.add(k, v);
            }
        })
    }

    #[test]
    fn form_encoding_table() {
        // (fields, expected)
        let cases: &[(&[(&str, &str)], &str)] = &[
            (&[("login", "user"), ("email", "john.doe@gmail.com")], "login=user&email=john.doe%40gmail.com"),
            (&[("q", "a b"), ("sym", "&=+")], "q=a+b&sym=%26%3D%2B"),
            (&[("dup", "1"), ("dup", "2")], "dup=1&dup=2"),
            (&[("empty", "")], "empty="),
            (&[], ""),
        ];
        for &(fields, expected) in cases {
            let payload = form(fields).encode().unwrap();
            assert_eq!(payload.as_str(), expected, "{fields:?}");
            assert_eq!(payload.kind(), BodyKind::Form);
            assert_eq!(payload.content_type(), FORM_CONTENT_TYPE);
        }
    }

    #[test]
    fn json_keeps_declaration_order() {
        let payload = json(&[("zeta", "1"), ("alpha", "2"), ("mid", "3")])
            .encode()
            .unwrap();
        assert_eq!(payload.as_str(), r#"{"zeta":"1","alpha":"2","mid":"3"}"#);
        assert_eq!(payload.content_type(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn json_escapes_strings() {
        let payload = json(&[("quote\"key", "line\nbreak \\ \u{1}")]).encode().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(payload.as_str()).unwrap();
        assert_eq!(parsed["quote\"key"], "line\nbreak \\ \u{1}");
    }

    #[test]
    fn json_duplicate_replaces_in_place() {
        let body = BodySelector::new().json(|j| {
            j.add("a", "1").add("b", "2").add("a", 3);
        });
        let payload = body.encode().unwrap();
        assert_eq!(payload.as_str(), r#"{"a":"3","b":"2"}"#);
    }

    #[test]
    fn empty_json_is_empty_object() {
        assert_eq!(json(&[]).encode().unwrap().as_str(), "{}");
    }

    #[test]
    fn body_kind_and_iteration() {
        let body = form(&[("k", "v")]);
        assert_eq!(body.kind(), BodyKind::Form);
        match &body {
            Body::Form(f) => assert_eq!(f.iter().collect::<Vec<_>>(), [("k", "v")]),
            Body::Json(_) => panic!("expected form"),
        }
        let body = json(&[("k", "v")]);
        assert_eq!(body.kind(), BodyKind::Json);
        if let Body::Json(j) = &body {
            assert_eq!(j.iter().collect::<Vec<_>>(), [("k", "v")]);
        }
        let bytes = body.encode().unwrap().into_bytes();
        assert_eq!(&bytes[..], br#"{"k":"v"}"#);
    }
}
