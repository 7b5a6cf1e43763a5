//! Transport collaborator.
//!
//! [`Client`] sends an assembled [`Request`] through `reqwest` and hands the
//! response back untouched. Create one via [`Client::builder()`]. `Client`
//! is cheap to clone; clones share the connection pool.

use crate::error::Error;
use crate::request::Request;
use http::{HeaderMap, HeaderValue};
use std::time::Duration;

/// An async HTTP client for assembled requests.
///
/// ```rust,no_run
/// # async fn run() -> httpctx::Result<()> {
/// use std::time::Duration;
///
/// let client = httpctx::Client::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// let req = httpctx::Request::get(|ctx| {
///     ctx.url("https://postman-echo.com/get?foo=bar")?;
///     Ok(())
/// })?;
/// let resp = client.execute(req).await?;
/// println!("{}", resp.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    default_headers: HeaderMap,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish()
    }
}

/// Builder for a [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<HeaderValue>,
    default_headers: HeaderMap,
    error: Option<Error>,
}

impl Client {
    /// Create a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Send an assembled request.
    ///
    /// Default headers are added first, except for names the request
    /// declares itself.
    ///
    /// # Errors
    ///
    /// Connect, timeout or request errors from the transport, each carrying
    /// the request URL.
    pub async fn execute(&self, request: Request) -> Result<reqwest::Response, Error> {
        let (method, url, headers, body) = request.into_parts();

        let mut merged = HeaderMap::with_capacity(self.default_headers.len() + headers.len());
        for (name, value) in &self.default_headers {
            if !headers.contains_key(name) {
                merged.append(name.clone(), value.clone());
            }
        }
        for (name, value) in &headers {
            merged.append(name.clone(), value.clone());
        }

        trace!(method = %method, url = %url, "Client::execute");

        let mut builder = self.inner.request(method, url.as_str()).headers(merged);
        if let Some(payload) = body {
            builder = builder.body(payload.into_bytes());
        }
        let response = builder
            .send()
            .await
            .map_err(|e| Error::from_transport(e).with_url(url.clone()))?;

        debug!(url = %url, status = response.status().as_u16(), "response received");
        Ok(response)
    }
}

impl ClientBuilder {
    /// Total timeout per request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Timeout for the connect phase only.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the `User-Agent` header. Invalid values are reported by
    /// [`build()`](Self::build).
    #[must_use]
    pub fn user_agent<V>(mut self, value: V) -> Self
    where
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        match HeaderValue::try_from(value) {
            Ok(v) => self.user_agent = Some(v),
            Err(e) => {
                let e: http::Error = e.into();
                self.error = Some(Error::invalid_argument("invalid user-agent").with_source(e));
            }
        }
        self
    }

    /// Headers added to every request unless the request sets the same name.
    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// The first deferred configuration error, or a transport setup error.
    pub fn build(self) -> Result<Client, Error> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut builder = reqwest::Client::builder();
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        if let Some(t) = self.connect_timeout {
            builder = builder.connect_timeout(t);
        }
        if let Some(ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        let inner = builder.build().map_err(Error::from_transport)?;
        Ok(Client {
            inner,
            default_headers: self.default_headers,
        })
    }
}
