//! The mutable request-construction context.
//!
//! A [`RequestContext`] is created for one request, mutated by directive
//! calls, and consumed by [`assemble`](RequestContext::assemble). Because
//! `assemble` takes `self`, an assembled context cannot be mutated again.

use crate::body::{Body, BodySelector};
use crate::error::Error;
use crate::headers::Headers;
use crate::params::Params;
use crate::request::Request;
use crate::url::{IntoUrl, Scheme, Url, validate_host};
use http::Method;
use http::header::{CONTENT_TYPE, HeaderValue};

/// Builder state for one request.
///
/// Directives mirror the fields of the final request: `scheme`, `host`,
/// `port` and `path` set URL components directly; `url` parses a whole
/// URL; `param`, `header` and `body` open their respective scopes.
///
/// ```
/// use httpctx::{Method, RequestContext};
///
/// # fn main() -> httpctx::Result<()> {
/// let mut ctx = RequestContext::new(Method::GET);
/// ctx.url("https://www.example.org/path?a=xxx&a=")?;
/// ctx.param(|p| {
///     p.add("a", "yyy");
/// });
/// let req = ctx.assemble()?;
/// assert_eq!(req.url().as_str(), "https://www.example.org/path?a=xxx&a=&a=yyy");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    scheme: Scheme,
    host: Option<String>,
    port: Option<u16>,
    path: String,
    /// Parameters loaded from the last `url` directive.
    query: Params,
    /// Parameters added through `param`.
    params: Params,
    headers: Headers,
    body: Option<Body>,
}

impl RequestContext {
    /// Start building a request with `method`.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            scheme: Scheme::default(),
            host: None,
            port: None,
            path: String::new(),
            query: Params::new(),
            params: Params::new(),
            headers: Headers::default(),
            body: None,
        }
    }

    /// Set the scheme.
    pub fn scheme(&mut self, scheme: Scheme) -> &mut Self {
        self.scheme = scheme;
        self
    }

    /// Set the host. Checked for whitespace and control characters when
    /// the request is assembled.
    pub fn host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port. `0` is rejected when the request is assembled.
    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    /// Set the path. Query parameters go through [`param`](Self::param);
    /// a path containing `?` or `#` fails assembly.
    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }

    /// Load scheme, host, port, path and query parameters from a URL.
    ///
    /// Replaces the URL components and any parameters loaded by an earlier
    /// `url` call. Parameters added with [`param`](Self::param) are kept
    /// and still follow the URL's own parameters. The fragment is ignored.
    ///
    /// # Errors
    ///
    /// Malformed-input when the URL has no `scheme://` prefix;
    /// invalid-argument for an unsupported scheme, an empty host, a bad
    /// port, or a query token without `=`.
    pub fn url(&mut self, url: impl IntoUrl) -> Result<&mut Self, Error> {
        let url = url.into_url()?;
        let query = match url.query() {
            Some(q) => Params::parse_query(q)?,
            None => Params::new(),
        };
        debug!(url = %url, params = query.len(), "loaded request URL");

        self.scheme = url.scheme_kind();
        self.host = url.host_str().map(str::to_owned);
        self.port = url.port();
        self.path = url.path().to_owned();
        self.query = query;
        Ok(self)
    }

    /// Open the parameter scope. Values are appended, never replaced.
    pub fn param<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Params),
    {
        f(&mut self.params);
        self
    }

    /// Open the header scope (which in turn nests the cookie scope).
    pub fn header<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Headers),
    {
        f(&mut self.headers);
        self
    }

    /// Select and fill the body.
    ///
    /// # Errors
    ///
    /// Invalid-argument if a body was already selected for this request.
    pub fn body<F>(&mut self, f: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(BodySelector) -> Body,
    {
        if self.body.is_some() {
            return Err(Error::invalid_argument("request body already selected"));
        }
        self.body = Some(f(BodySelector::new()));
        Ok(self)
    }

    /// The query parameters the request will carry: URL-derived first,
    /// then explicit ones.
    pub fn query_params(&self) -> Params {
        let mut merged = self.query.clone();
        merged.extend(&self.params);
        merged
    }

    /// Validate and render the final [`Request`].
    ///
    /// # Errors
    ///
    /// Invalid-argument when the host is missing, empty or contains
    /// whitespace, the port is `0`, the path contains `?` or `#`, or a
    /// header name or value is not valid HTTP; a body error when the
    /// payload cannot be encoded.
    pub fn assemble(self) -> Result<Request, Error> {
        let host = match self.host.as_deref() {
            Some(h) if !h.is_empty() => h.to_owned(),
            _ => return Err(Error::invalid_argument("host is required")),
        };
        validate_host(&host)?;
        if self.port == Some(0) {
            return Err(Error::invalid_argument("port must be in 1..=65535"));
        }
        if self.path.contains(['?', '#']) {
            return Err(Error::invalid_argument("path must not contain '?' or '#'"));
        }

        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        let url = Url::from_parts(
            self.scheme,
            host,
            self.port,
            path,
            self.query_params().to_query_string(),
            None,
        );

        let mut headers = self.headers.to_header_map()?;
        let payload = match &self.body {
            Some(body) => {
                let payload = body.encode()?;
                if !self.headers.contains(CONTENT_TYPE.as_str()) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(payload.content_type()));
                }
                Some(payload)
            }
            None => None,
        };

        debug!(
            method = %self.method,
            url = %url,
            headers = headers.len(),
            body = payload.as_ref().map(|p| p.content_type()),
            "assembled request",
        );
        Ok(Request::from_parts(self.method, url, headers, payload))
    }
}
