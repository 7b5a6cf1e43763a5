//! Error type for httpctx.
//!
//! Every failure carries an [`ErrorKind`] classification that backs the
//! `is_*` query methods on [`Error`]. Construction failures are
//! [`is_malformed_input()`](Error::is_malformed_input) or
//! [`is_invalid_argument()`](Error::is_invalid_argument); the remaining
//! kinds come from payload encoding and from the transport.

use crate::url::{ParseError, Url};
use std::fmt;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type for httpctx operations.
///
/// When the request URL is known (transport failures), it is appended to
/// the `Display` output.
pub struct Error {
    pub(crate) kind: ErrorKind,
    pub(crate) message: String,
    pub(crate) source: Option<BoxError>,
    pub(crate) url: Option<Box<Url>>,
}

/// Classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// The URL string has no parseable `scheme://` prefix.
    MalformedInput,
    /// A value was rejected by validation (scheme, host, port, query token,
    /// header, body selection).
    InvalidArgument,
    /// The payload could not be serialised.
    Body,
    /// The transport could not connect.
    #[cfg_attr(not(feature = "client"), expect(dead_code))]
    Connect,
    /// The transport timed out.
    #[cfg_attr(not(feature = "client"), expect(dead_code))]
    Timeout,
    /// Any other transport failure.
    #[cfg_attr(not(feature = "client"), expect(dead_code))]
    Request,
}

impl Error {
    /// Returns `true` if the input lacked a recognizable protocol prefix.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedInput)
    }

    /// Returns `true` if a scheme, host, port, query token, header or body
    /// selection was rejected.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidArgument)
    }

    /// Returns `true` if the request payload could not be encoded.
    pub fn is_body(&self) -> bool {
        matches!(self.kind, ErrorKind::Body)
    }

    /// Returns `true` if the transport failed to connect.
    pub fn is_connect(&self) -> bool {
        matches!(self.kind, ErrorKind::Connect)
    }

    /// Returns `true` if the transport timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns `true` for any other transport failure.
    pub fn is_request(&self) -> bool {
        matches!(self.kind, ErrorKind::Request)
    }

    /// Returns the human-readable detail of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the request URL associated with this error, if available.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_deref()
    }

    /// Attach a request URL to this error.
    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(Box::new(url));
        self
    }

    /// Attach a source error, exposed through [`std::error::Error::source`].
    #[must_use]
    pub(crate) fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            source: None,
            url: None,
        }
    }

    pub(crate) fn malformed_input(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::MalformedInput, msg)
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::InvalidArgument, msg)
    }

    pub(crate) fn body(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Body, msg)
    }

    /// Classify a transport error.
    #[cfg(feature = "client")]
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connect
        } else {
            ErrorKind::Request
        };
        Self::with_kind(kind, err.to_string()).with_source(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        let base = match err {
            ParseError::MissingScheme => Error::malformed_input("URL has no protocol"),
            _ => Error::invalid_argument("invalid URL"),
        };
        base.with_source(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ErrorKind::MalformedInput => "malformed input",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Body => "request body error",
            ErrorKind::Connect => "error trying to connect",
            ErrorKind::Timeout => "operation timed out",
            ErrorKind::Request => "error sending request",
        };
        write!(f, "{prefix}: {}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        if let Some(url) = &self.url {
            write!(f, " for url ({url})")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("url", &self.url)
            .field("source", &self.source)
            .finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}
