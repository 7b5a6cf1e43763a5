//! The assembled request.
//!
//! [`Request`] is the immutable output of
//! [`RequestContext::assemble`](crate::RequestContext::assemble): method,
//! canonical URL, final header set and optional payload. It performs no
//! I/O; hand it to [`Client::execute`](crate::Client::execute) or convert it
//! with [`into_http`](Request::into_http) for another transport.

use crate::body::Payload;
use crate::context::RequestContext;
use crate::error::Error;
use crate::url::Url;
use bytes::Bytes;
use http::{HeaderMap, Method};

// The descriptor crosses thread boundaries once built.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Request>();
};

/// A fully assembled HTTP request.
///
/// ```
/// # fn main() -> httpctx::Result<()> {
/// let req = httpctx::Request::put(|ctx| {
///     ctx.host("postman-echo.com").path("/put");
///     ctx.param(|p| {
///         p.add("arg", "iphone");
///     });
///     ctx.body(|b| {
///         b.form(|f| {
///             f.add("login", "user");
///         })
///     })?;
///     Ok(())
/// })?;
/// assert_eq!(req.url().as_str(), "http://postman-echo.com/put?arg=iphone");
/// assert_eq!(req.body().map(|p| p.as_str()), Some("login=user"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Payload>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(Payload::kind))
            .finish()
    }
}

impl Request {
    pub(crate) fn from_parts(
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Payload>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// Run a configuration block against a fresh context for `method`,
    /// then assemble it.
    ///
    /// The first error returned by the block (or by assembly) is returned
    /// unchanged.
    pub fn build<F>(method: Method, f: F) -> Result<Request, Error>
    where
        F: FnOnce(&mut RequestContext) -> Result<(), Error>,
    {
        let mut ctx = RequestContext::new(method);
        f(&mut ctx)?;
        ctx.assemble()
    }

    /// Build a `GET` request.
    pub fn get<F>(f: F) -> Result<Request, Error>
    where
        F: FnOnce(&mut RequestContext) -> Result<(), Error>,
    {
        Request::build(Method::GET, f)
    }

    /// Build a `POST` request.
    pub fn post<F>(f: F) -> Result<Request, Error>
    where
        F: FnOnce(&mut RequestContext) -> Result<(), Error>,
    {
        Request::build(Method::POST, f)
    }

    /// Build a `PUT` request.
    pub fn put<F>(f: F) -> Result<Request, Error>
    where
        F: FnOnce(&mut RequestContext) -> Result<(), Error>,
    {
        Request::build(Method::PUT, f)
    }

    /// Build a `PATCH` request.
    pub fn patch<F>(f: F) -> Result<Request, Error>
    where
        F: FnOnce(&mut RequestContext) -> Result<(), Error>,
    {
        Request::build(Method::PATCH, f)
    }

    /// Build a `DELETE` request.
    pub fn delete<F>(f: F) -> Result<Request, Error>
    where
        F: FnOnce(&mut RequestContext) -> Result<(), Error>,
    {
        Request::build(Method::DELETE, f)
    }

    /// Build a `HEAD` request.
    pub fn head<F>(f: F) -> Result<Request, Error>
    where
        F: FnOnce(&mut RequestContext) -> Result<(), Error>,
    {
        Request::build(Method::HEAD, f)
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The canonical URL: `scheme://host[:port]/path[?query]`.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The final header set, including the `cookie` header and the implied
    /// content type.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The rendered body, if one was declared.
    pub fn body(&self) -> Option<&Payload> {
        self.body.as_ref()
    }

    /// Decompose into method, URL, headers and payload.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Payload>) {
        (self.method, self.url, self.headers, self.body)
    }

    /// Convert into an [`http::Request`] for use with any transport.
    ///
    /// # Errors
    ///
    /// Invalid-argument if the URL cannot be represented as an
    /// [`http::Uri`] (for example, a host with characters `http` rejects).
    pub fn into_http(self) -> Result<http::Request<Bytes>, Error> {
        let uri = self.url.to_http_uri().map_err(|e| {
            Error::invalid_argument("URL is not a valid request target")
                .with_source(e)
                .with_url(self.url.clone())
        })?;
        let mut req = http::Request::new(self.body.map(Payload::into_bytes).unwrap_or_default());
        *req.method_mut() = self.method;
        *req.uri_mut() = uri;
        *req.headers_mut() = self.headers;
        Ok(req)
    }
}
