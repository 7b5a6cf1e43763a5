//! URL parsing and validation.
//!
//! [`Url`] is a small, strict parser for absolute `http`/`https` URLs. It
//! does not pull in the `url` crate: the request layer only needs scheme,
//! host, port, path, raw query and fragment, and needs the validation
//! failures classified precisely (see [`ParseError`]).
//!
//! [`IntoUrl`] is the sealed conversion trait accepted by
//! [`RequestContext::url`](crate::RequestContext::url). It is implemented
//! for strings, [`Url`] and [`http::Uri`].
//!
//! # Rules
//!
//! - The input must start with `scheme://`. Anything else (`host/path`,
//!   `www.example.org:8080/path`) is [`ParseError::MissingScheme`].
//! - Only `http` and `https` are accepted, case-insensitively.
//! - Userinfo (`user:pass@`) is dropped.
//! - The host must be non-empty; a written port must be in `1..=65535`.
//! - `?` with nothing after it means "no query".

use crate::Error;
use std::fmt;

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// Why a URL was rejected.
///
/// Converted into [`Error`] with `?`: [`MissingScheme`](Self::MissingScheme)
/// becomes a malformed-input error, every other variant an
/// invalid-argument error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The input has no `scheme://` prefix.
    MissingScheme,
    /// The scheme is not `http` or `https`.
    UnsupportedScheme,
    /// The URL has no host, or an empty one.
    EmptyHost,
    /// The host contains whitespace, control characters, or an unterminated
    /// IPv6 bracket.
    InvalidDomainCharacter,
    /// The port is not an integer in `1..=65535`.
    InvalidPort,
    /// A query token has no `=` separator.
    QueryWithoutValue,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingScheme => f.write_str("no protocol prefix"),
            ParseError::UnsupportedScheme => f.write_str("unsupported URL scheme"),
            ParseError::EmptyHost => f.write_str("empty host"),
            ParseError::InvalidDomainCharacter => f.write_str("invalid domain character"),
            ParseError::InvalidPort => f.write_str("invalid port number"),
            ParseError::QueryWithoutValue => f.write_str("query parameter without value"),
        }
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Scheme
// ---------------------------------------------------------------------------

/// The two supported URL schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
    /// `http`, the default when only a host is configured.
    #[default]
    Http,
    /// `https`.
    Https,
}

impl Scheme {
    /// The lowercase scheme name.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// The well-known port: 80 or 443.
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scheme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Scheme::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Scheme::Https)
        } else {
            Err(ParseError::UnsupportedScheme)
        }
    }
}

// ---------------------------------------------------------------------------
// Url
// ---------------------------------------------------------------------------

/// A parsed absolute `http`/`https` URL.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Url {
    serialized: String,
    scheme: Scheme,
    /// Host as written; IPv6 literals keep their brackets.
    host: String,
    /// Port only when written in the URL.
    port: Option<u16>,
    /// Path as written; `""` when the URL has none.
    path: String,
    /// Raw query without the leading `?`; never `Some("")`.
    query: Option<String>,
    /// Fragment without the leading `#`; never `Some("")`.
    fragment: Option<String>,
}

impl Url {
    /// Parse an absolute URL string.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Url::parse_impl(input)
    }

    /// The serialized URL.
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    /// The scheme name, `"http"` or `"https"`.
    pub fn scheme(&self) -> &str {
        self.scheme.as_str()
    }

    /// The scheme as an enum.
    pub fn scheme_kind(&self) -> Scheme {
        self.scheme
    }

    /// The host. Always `Some` for `http`/`https` URLs.
    pub fn host_str(&self) -> Option<&str> {
        Some(&self.host)
    }

    /// The port, if one was written in the URL.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The port, falling back to the scheme's default.
    pub fn port_or_known_default(&self) -> Option<u16> {
        Some(self.port.unwrap_or(self.scheme.default_port()))
    }

    /// The path as written; `""` when the URL has no path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query without `?`, if present and non-empty.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The fragment without `#`, if present and non-empty.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub(crate) fn parse_impl(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();

        let (before_fragment, fragment) = match input.split_once('#') {
            Some((before, frag)) => (before, non_empty(frag)),
            None => (input, None),
        };

        let (scheme_str, rest) = before_fragment
            .split_once("://")
            .filter(|(s, _)| is_scheme_syntax(s))
            .ok_or(ParseError::MissingScheme)?;
        let scheme: Scheme = scheme_str.parse()?;

        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);

        // Userinfo is not used by this crate; keep only what follows '@'.
        let authority = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
        let (host, port) = split_host_port(authority)?;

        let (path, query) = match tail.split_once('?') {
            Some((path, query)) => (path, non_empty(query)),
            None => (tail, None),
        };

        let url = Url::from_parts(scheme, host.to_owned(), port, path.to_owned(), query, fragment);
        trace!(
            scheme = url.scheme(),
            host = url.host.as_str(),
            port = url.port,
            has_query = url.query.is_some(),
            "parsed URL",
        );
        Ok(url)
    }

    /// Build a `Url` from already-validated components.
    pub(crate) fn from_parts(
        scheme: Scheme,
        host: String,
        port: Option<u16>,
        path: String,
        query: Option<String>,
        fragment: Option<String>,
    ) -> Self {
        let mut serialized = format!("{scheme}://{host}");
        if let Some(port) = port {
            serialized.push(':');
            serialized.push_str(&port.to_string());
        }
        serialized.push_str(&path);
        if let Some(q) = &query {
            serialized.push('?');
            serialized.push_str(q);
        }
        if let Some(f) = &fragment {
            serialized.push('#');
            serialized.push_str(f);
        }
        Url {
            serialized,
            scheme,
            host,
            port,
            path,
            query,
            fragment,
        }
    }

    /// Build a `Url` from an [`http::Uri`].
    ///
    /// `http::Uri` models scheme and authority as optional; both absences
    /// are reported as parse errors here instead of being unwrapped.
    pub(crate) fn from_http_uri(uri: &http::Uri) -> Result<Self, ParseError> {
        let scheme: Scheme = uri
            .scheme_str()
            .ok_or(ParseError::MissingScheme)?
            .parse()?;

        let authority = uri.authority().ok_or(ParseError::EmptyHost)?;
        let host = authority.host();
        validate_host(host)?;
        let port = match authority.port_u16() {
            Some(0) => return Err(ParseError::InvalidPort),
            other => other,
        };

        let (path, query) = match uri.path_and_query() {
            Some(pq) => (pq.path().to_owned(), pq.query().and_then(non_empty)),
            None => (String::new(), None),
        };

        Ok(Url::from_parts(scheme, host.to_owned(), port, path, query, None))
    }

    /// Convert into an [`http::Uri`]. The fragment is dropped.
    pub(crate) fn to_http_uri(&self) -> Result<http::Uri, http::Error> {
        let authority = match self.port {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        };
        let path_and_query = match (&self.path, &self.query) {
            (p, Some(q)) => format!("{}?{q}", if p.is_empty() { "/" } else { p.as_str() }),
            (p, None) if p.is_empty() => "/".to_owned(),
            (p, None) => p.clone(),
        };
        http::Uri::builder()
            .scheme(self.scheme.as_str())
            .authority(authority.as_str())
            .path_and_query(path_and_query.as_str())
            .build()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

impl fmt::Debug for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Url")
            .field("scheme", &self.scheme.as_str())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("fragment", &self.fragment)
            .finish()
    }
}

impl AsRef<str> for Url {
    fn as_ref(&self) -> &str {
        &self.serialized
    }
}

impl From<Url> for String {
    fn from(url: Url) -> Self {
        url.serialized
    }
}

impl std::str::FromStr for Url {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse_impl(s)
    }
}

impl TryFrom<&str> for Url {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Url::parse_impl(s)
    }
}

impl TryFrom<String> for Url {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Url::parse_impl(&s)
    }
}

impl serde::Serialize for Url {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Url {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Url::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// IntoUrl
// ---------------------------------------------------------------------------

/// Carries the conversion method. Not re-exported, which seals [`IntoUrl`].
pub trait IntoUrlSealed {
    /// Convert into a validated [`Url`].
    fn into_url(self) -> Result<Url, Error>;
}

/// Types accepted by [`RequestContext::url`](crate::RequestContext::url):
/// `&str`, `String`, `&String`, [`Url`], `&Url`, [`http::Uri`] and
/// `&http::Uri`.
///
/// This trait is sealed.
pub trait IntoUrl: IntoUrlSealed {}

impl IntoUrlSealed for &str {
    fn into_url(self) -> Result<Url, Error> {
        Ok(Url::parse_impl(self)?)
    }
}
impl IntoUrl for &str {}

impl IntoUrlSealed for String {
    fn into_url(self) -> Result<Url, Error> {
        Ok(Url::parse_impl(&self)?)
    }
}
impl IntoUrl for String {}

impl IntoUrlSealed for &String {
    fn into_url(self) -> Result<Url, Error> {
        Ok(Url::parse_impl(self)?)
    }
}
impl IntoUrl for &String {}

impl IntoUrlSealed for Url {
    fn into_url(self) -> Result<Url, Error> {
        Ok(self)
    }
}
impl IntoUrl for Url {}

impl IntoUrlSealed for &Url {
    fn into_url(self) -> Result<Url, Error> {
        Ok(self.clone())
    }
}
impl IntoUrl for &Url {}

impl IntoUrlSealed for http::Uri {
    fn into_url(self) -> Result<Url, Error> {
        Ok(Url::from_http_uri(&self)?)
    }
}
impl IntoUrl for http::Uri {}

impl IntoUrlSealed for &http::Uri {
    fn into_url(self) -> Result<Url, Error> {
        Ok(Url::from_http_uri(self)?)
    }
}
impl IntoUrl for &http::Uri {}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_owned()) }
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )` per RFC 3986 §3.1.
fn is_scheme_syntax(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// Split `host[:port]`, handling bracketed IPv6 literals.
fn split_host_port(authority: &str) -> Result<(&str, Option<u16>), ParseError> {
    let (host, port) = if authority.starts_with('[') {
        let close = authority
            .find(']')
            .ok_or(ParseError::InvalidDomainCharacter)?;
        let (host, after) = authority.split_at(close + 1);
        match after {
            "" => (host, None),
            _ => match after.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => return Err(ParseError::InvalidDomainCharacter),
            },
        }
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    validate_host(host)?;
    let port = match port {
        None | Some("") => None,
        Some(p) => Some(parse_port(p)?),
    };
    Ok((host, port))
}

pub(crate) fn validate_host(host: &str) -> Result<(), ParseError> {
    if host.is_empty() || host == "[]" {
        return Err(ParseError::EmptyHost);
    }
    if host
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ParseError::InvalidDomainCharacter);
    }
    Ok(())
}

fn parse_port(s: &str) -> Result<u16, ParseError> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidPort);
    }
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err(ParseError::InvalidPort),
        Ok(port) => Ok(port),
    }
}

/// Percent-decode a string (e.g. `%40` → `@`). `+` is left as is.
///
/// Invalid escapes are kept literally. Returns `None` when the decoded
/// bytes are not UTF-8.
pub(crate) fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_owned());
    }
    let mut out = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_nibble(bytes[i + 1]), hex_nibble(bytes[i + 2]))
        {
            out.push(hi << 4 | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}

fn hex_nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
