//! Ordered, multi-valued query parameters.
//!
//! [`Params`] keeps every `(key, value)` pair in the order it was added,
//! so repeated keys may interleave with other keys. It only grows: `add`
//! appends and nothing removes.

use crate::url::{ParseError, percent_decode};
use crate::value::Value;

/// An ordered multimap of query parameters.
///
/// ```
/// use httpctx::Params;
///
/// let mut params = Params::new();
/// params.add("a", "").add("b", "x").add("a", 123);
/// assert_eq!(params.get_all("a").collect::<Vec<_>>(), ["", "123"]);
/// assert_eq!(params.to_query_string().as_deref(), Some("a=&b=x&a=123"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: String,
    // Parsed components that do not decode to UTF-8 are stored as written
    // and rendered without re-escaping their `%XX` sequences.
    raw_key: bool,
    raw_value: bool,
}

impl Params {
    /// Create an empty multimap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `(key, value)` pair. Existing values for `key` are kept.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.push(Entry {
            key: key.into(),
            value: value.into().into_string(),
            raw_key: false,
            raw_value: false,
        });
        self
    }

    /// Append every pair of `other`, in its iteration order.
    pub fn extend(&mut self, other: &Params) -> &mut Self {
        self.entries.extend(other.entries.iter().cloned());
        self
    }

    /// The first value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).next()
    }

    /// Every value stored for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Returns `true` if `key` has at least one value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .enumerate()
            .filter(|&(i, e)| !self.entries[..i].iter().any(|prev| prev.key == e.key))
            .map(|(_, e)| e.key.as_str())
    }

    /// Lazily yield every `(key, value)` pair in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
    }

    /// Tokenize a raw query string (without the leading `?`).
    ///
    /// Tokens are separated by `&` and split on the first `=`; keys and
    /// values are percent-decoded. A component whose escapes do not decode
    /// to UTF-8 is kept as written. Every token needs an `=`, so `foo`,
    /// `a=1&&b=2` and `a=1&` are rejected with
    /// [`ParseError::QueryWithoutValue`]. The empty string yields no pairs.
    pub fn parse_query(query: &str) -> Result<Params, ParseError> {
        let mut params = Params::new();
        if query.is_empty() {
            return Ok(params);
        }
        for token in query.split('&') {
            let (key, value) = token
                .split_once('=')
                .ok_or(ParseError::QueryWithoutValue)?;
            let (key, raw_key) = decode_component(key);
            let (value, raw_value) = decode_component(value);
            params.entries.push(Entry {
                key,
                value,
                raw_key,
                raw_value,
            });
        }
        Ok(params)
    }

    /// Render as `key=value` pairs joined by `&`.
    ///
    /// Returns `None` when empty, so an assembled URL never ends in a
    /// bare `?`.
    pub fn to_query_string(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut out = String::new();
        for entry in &self.entries {
            if !out.is_empty() {
                out.push('&');
            }
            encode_component(&entry.key, true, entry.raw_key, &mut out);
            out.push('=');
            encode_component(&entry.value, false, entry.raw_value, &mut out);
        }
        Some(out)
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}

/// Decode one query component, or keep it verbatim (`true`) when the
/// decoded bytes are not UTF-8.
fn decode_component(input: &str) -> (String, bool) {
    match percent_decode(input) {
        Some(decoded) => (decoded, false),
        None => (input.to_owned(), true),
    }
}

/// Percent-encode one query component.
///
/// Only characters that would change the structure of the query (or are
/// not allowed in a URL at all) are escaped; `[` and `]` pass through so
/// that `id[]=1` renders unchanged. `=` is escaped in keys only. A `raw`
/// component keeps its `%` bytes, which are already escapes.
fn encode_component(input: &str, is_key: bool, raw: bool, out: &mut String) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in input.as_bytes() {
        let escape = match b {
            b'=' => is_key,
            b'%' => !raw,
            b' ' | b'"' | b'#' | b'&' | b'+' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{'
            | b'|' | b'}' => true,
            0x00..=0x1F | 0x7F..=0xFF => true,
            _ => false,
        };
        if escape {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0F)]));
        } else {
            out.push(char::from(b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_never_overwrites() {
        let mut p = Params::new();
        p.add("a", "").add("a", 123).add("a", "xxx");
        assert_eq!(p.len(), 3);
        assert_eq!(p.get("a"), Some(""));
        assert_eq!(p.get_all("a").collect::<Vec<_>>(), ["", "123", "xxx"]);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut p = Params::new();
        p.add("a", 1).add("b", 2).add("a", 3);
        let pairs: Vec<_> = p.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("a", "3")]);
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(p.get_all("a").collect::<Vec<_>>(), ["1", "3"]);
        assert_eq!(p.get_all("missing").count(), 0);
        assert_eq!(p.get("missing"), None);
    }

    #[test]
    fn extend_appends_after_existing_values() {
        let mut from_url = Params::parse_query("a=xxx&b=1&a=").unwrap();
        let mut explicit = Params::new();
        explicit.add("c", 2).add("a", "yyy");
        from_url.extend(&explicit);
        assert_eq!(
            from_url.to_query_string().as_deref(),
            Some("a=xxx&b=1&a=&c=2&a=yyy")
        );
    }

    /// Each entry: (raw query, expected pairs).
    const PARSE_CASES: &[(&str, &[(&str, &str)])] = &[
        ("a=b", &[("a", "b")]),
        ("a=b&c=&d=123", &[("a", "b"), ("c", ""), ("d", "123")]),
        ("a=&a=123&a=xxx", &[("a", ""), ("a", "123"), ("a", "xxx")]),
        ("a=1&b=2&a=3", &[("a", "1"), ("b", "2"), ("a", "3")]),
        ("id[]=1&id[]=2", &[("id[]", "1"), ("id[]", "2")]),
        ("k=v=w", &[("k", "v=w")]),
        ("=v", &[("", "v")]),
        ("q=hello%20world&x=%E2%9C%93", &[("q", "hello world"), ("x", "\u{2713}")]),
        ("plus=a+b", &[("plus", "a+b")]),
        ("x=%FF", &[("x", "%FF")]),
    ];

    #[test]
    fn parse_query_table() {
        for &(raw, expected) in PARSE_CASES {
            let p = Params::parse_query(raw).unwrap_or_else(|e| panic!("{raw}: {e}"));
            let got: Vec<_> = p.iter().collect();
            assert_eq!(got, expected, "{raw}");
        }
    }

    #[test]
    fn parse_query_rejects_token_without_separator() {
        for raw in ["foo", "a=1&foo", "foo&a=1", "a=1&&b=2", "a=1&", "&a=1", "&"] {
            assert_eq!(Params::parse_query(raw), Err(ParseError::QueryWithoutValue), "{raw}");
        }
    }

    /// Each entry: (raw query, rendered query).
    const RENDER_CASES: &[(&str, &str)] = &[
        ("a=b", "a=b"),
        ("a=b&c=&d=123", "a=b&c=&d=123"),
        ("a=1&b=2&a=3", "a=1&b=2&a=3"),
        ("b=1&a=x&b=2&c=3&a=y", "b=1&a=x&b=2&c=3&a=y"),
        ("id[]=1&id[]=2", "id[]=1&id[]=2"),
        ("k=v=w", "k=v=w"),
        ("q=hello%20world", "q=hello%20world"),
        ("path=/a/b?c", "path=/a/b?c"),
        ("x=%E2%9C%93", "x=%E2%9C%93"),
        ("x=%FF", "x=%FF"),
        ("%C3%28=1&y=a%FFb", "%C3%28=1&y=a%FFb"),
    ];

    #[test]
    fn parse_then_render_is_stable() {
        for &(raw, rendered) in RENDER_CASES {
            let p = Params::parse_query(raw).unwrap();
            assert_eq!(p.to_query_string().as_deref(), Some(rendered), "{raw}");
        }
    }

    #[test]
    fn render_escapes_structural_characters() {
        let mut p = Params::new();
        p.add("a=b", "x&y").add("sp ace", "1+1#frag").add("pct", "100%");
        assert_eq!(
            p.to_query_string().as_deref(),
            Some("a%3Db=x%26y&sp%20ace=1%2B1%23frag&pct=100%25")
        );
    }

    #[test]
    fn empty_renders_none() {
        assert_eq!(Params::new().to_query_string(), None);
        assert!(Params::parse_query("").unwrap().is_empty());
    }

    #[test]
    fn collect_and_borrowing_iteration() {
        let p: Params = [("a", "1"), ("b", "2")].into_iter().collect();
        let mut seen = Vec::new();
        for (k, v) in &p {
            seen.push(format!("{k}={v}"));
        }
        assert_eq!(seen, ["a=1", "b=2"]);
        assert!(p.contains_key("b"));
        assert!(!p.contains_key("c"));
    }
}
