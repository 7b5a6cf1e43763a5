//! Header and cookie scopes.
//!
//! [`Headers`] collects `(name, value)` pairs in declaration order. Its
//! nested [`Cookies`] scope collects cookies separately; they are folded
//! into a single `cookie` header when the request is assembled.

use crate::error::Error;
use crate::value::Value;
use http::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};

/// The header scope of a request.
///
/// ```
/// # fn main() -> httpctx::Result<()> {
/// let req = httpctx::Request::get(|ctx| {
///     ctx.host("example.com").header(|h| {
///         h.add("one", 42);
///         h.cookie(|c| {
///             c.add("aaa", "bbb").add("ccc", 42);
///         });
///     });
///     Ok(())
/// })?;
/// assert_eq!(req.headers()["one"], "42");
/// assert_eq!(req.headers()["cookie"], "aaa=bbb; ccc=42");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
    cookies: Cookies,
}

impl Headers {
    /// Append a header. Repeated names accumulate.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.push((name.into(), value.into().into_string()));
        self
    }

    /// Open the cookie scope.
    pub fn cookie<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Cookies),
    {
        f(&mut self.cookies);
        self
    }

    /// Declared headers, excluding cookies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The cookie scope.
    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    /// Returns `true` if a header named `name` (case-insensitive) was
    /// declared outside the cookie scope.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Validate and convert into a [`HeaderMap`].
    ///
    /// Plain headers come first in declaration order, followed by the
    /// serialized `cookie` header when any cookie was declared.
    pub(crate) fn to_header_map(&self) -> Result<HeaderMap, Error> {
        let mut map = HeaderMap::with_capacity(self.entries.len() + 1);
        for (name, value) in &self.entries {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::invalid_argument(format!("invalid header name {name:?}")).with_source(e)
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::invalid_argument(format!("invalid value for header {name}")).with_source(e)
            })?;
            map.append(name, value);
        }
        if let Some(cookie) = self.cookies.to_header_value() {
            let value = HeaderValue::from_str(&cookie).map_err(|e| {
                Error::invalid_argument("invalid cookie header value").with_source(e)
            })?;
            map.append(COOKIE, value);
        }
        Ok(map)
    }
}

/// The cookie scope nested inside [`Headers`].
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    entries: Vec<(String, String)>,
}

impl Cookies {
    /// Append a cookie.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.push((name.into(), value.into().into_string()));
        self
    }

    /// Declared cookies in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of declared cookies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no cookie was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `n1=v1; n2=v2`, or `None` when empty.
    pub fn to_header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let joined = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(map: &HeaderMap, name: &str) -> Vec<String> {
        map.get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn cookie_scope_serializes_in_order() {
        let mut h = Headers::default();
        h.cookie(|c| {
            c.add("aaa", "bbb").add("ccc", 42);
        });
        assert_eq!(h.cookies().to_header_value().as_deref(), Some("aaa=bbb; ccc=42"));
        assert_eq!(h.cookies().len(), 2);

        let map = h.to_header_map().unwrap();
        assert_eq!(values(&map, "cookie"), ["aaa=bbb; ccc=42"]);
    }

    #[test]
    fn cookie_scopes_accumulate() {
        let mut h = Headers::default();
        h.cookie(|c| {
            c.add("a", 1);
        })
        .add("x", "y")
        .cookie(|c| {
            c.add("b", 2);
        });
        assert_eq!(h.cookies().to_header_value().as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn headers_and_cookie_converge() {
        let mut h = Headers::default();
        h.add("one", 42).add("x-multi", "a").add("x-multi", "b");
        h.cookie(|c| {
            c.add("sid", "abc");
        });
        let map = h.to_header_map().unwrap();
        assert_eq!(values(&map, "one"), ["42"]);
        assert_eq!(values(&map, "x-multi"), ["a", "b"]);
        assert_eq!(values(&map, "cookie"), ["sid=abc"]);
        assert!(h.contains("X-Multi"));
        assert!(!h.contains("cookie"));
    }

    #[test]
    fn no_cookies_no_cookie_header() {
        let mut h = Headers::default();
        h.add("accept", "*/*");
        assert!(h.cookies().is_empty());
        assert_eq!(h.cookies().to_header_value(), None);
        let map = h.to_header_map().unwrap();
        assert!(!map.contains_key(COOKIE));
        assert_eq!(h.iter().collect::<Vec<_>>(), [("accept", "*/*")]);
    }

    #[test]
    fn invalid_header_table() {
        // (name, value, label)
        let cases: &[(&str, &str, &str)] = &[
            ("invalid header name!", "value", "invalid name"),
            ("", "value", "empty name"),
            ("x-ok", "value\0with-null", "invalid value"),
            ("x-ok", "line\nbreak", "newline in value"),
        ];
        for &(name, value, label) in cases {
            let mut h = Headers::default();
            h.add(name, value);
            let err = h.to_header_map().expect_err(label);
            assert!(err.is_invalid_argument(), "{label}: {err}");
        }

        let mut h = Headers::default();
        h.cookie(|c| {
            c.add("bad", "a\rb");
        });
        assert!(h.to_header_map().unwrap_err().is_invalid_argument());
    }
}
