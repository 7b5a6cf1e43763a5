#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

#[macro_use]
mod tracing;

mod body;
#[cfg(feature = "client")]
mod client;
mod context;
mod error;
mod headers;
mod params;
mod request;
pub(crate) mod url;
mod value;

pub use body::{
    Body, BodyKind, BodySelector, FORM_CONTENT_TYPE, Form, JSON_CONTENT_TYPE, Json, Payload,
};
#[cfg(feature = "client")]
pub use client::{Client, ClientBuilder};
pub use context::RequestContext;
pub use error::Error;
pub use headers::{Cookies, Headers};
pub use params::Params;
pub use request::Request;
pub use url::{IntoUrl, ParseError, Scheme, Url};
pub use value::Value;

pub use http::HeaderMap;
pub use http::Method;
pub use http::StatusCode;
/// Re-export of `http::header` for header name constants.
pub use http::header;

/// The response type returned by [`Client::execute`].
#[cfg(feature = "client")]
pub use reqwest::Response;

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_alias() {
        fn returns_result() -> Result<u16> {
            Ok(Url::parse("https://example.com:8443/")?.port().unwrap_or(0))
        }
        assert_eq!(returns_result().unwrap(), 8443);
    }

    #[test]
    fn header_module_re_export() {
        assert_eq!(header::COOKIE.as_str(), "cookie");
        assert_eq!(header::CONTENT_TYPE.as_str(), "content-type");
    }

    /// Each public type with a `Debug` or `Display` impl gets formatted once.
    #[test]
    fn fmt_traits_smoke() {
        let req = Request::get(|ctx| {
            ctx.url("https://example.com/fmt?a=1")?;
            Ok(())
        })
        .unwrap();
        assert!(format!("{req:?}").contains("Request"));

        let ctx = RequestContext::new(Method::POST);
        assert!(format!("{ctx:?}").contains("RequestContext"));

        let url = req.url();
        assert!(format!("{url}").contains("example.com"));
        assert!(format!("{url:?}").starts_with("Url { "));

        assert_eq!(format!("{}", Scheme::Https), "https");
        assert_eq!(format!("{}", ParseError::EmptyHost), "empty host");
        assert_eq!(format!("{}", Value::from(7)), "7");

        let params: Params = [("a", "1")].into_iter().collect();
        assert!(format!("{params:?}").contains("Params"));

        let err = Error::from(ParseError::MissingScheme);
        assert!(!format!("{err}").is_empty());
        assert!(format!("{err:?}").contains("MalformedInput"));
    }
}
