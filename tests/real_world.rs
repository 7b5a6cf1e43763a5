//! Real-world integration tests against postman-echo.com.
//!
//! postman-echo reflects the request back as JSON, which validates the
//! assembled URL, headers, cookies and bodies against a real server with
//! real DNS and TLS.
//!
//! These tests need network access and are ignored by default. To run them:
//! ```
//! cargo test --test real_world -- --ignored
//! ```

#![cfg(feature = "client")]
#![expect(clippy::tests_outside_test_module)]

use httpctx::{Client, Request, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Helper: build a client with sensible defaults for real-world tests
fn test_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .expect("client build should succeed")
}

async fn echo(req: Request) -> Value {
    let resp = test_client()
        .execute(req)
        .await
        .expect("postman-echo should be reachable");
    assert_eq!(resp.status(), StatusCode::OK);
    let text = resp.text().await.expect("should read body");
    serde_json::from_str(&text).expect("echo body is JSON")
}

/// GET with URL and explicit parameters, including repeated keys.
#[tokio::test]
#[ignore = "requires network access"]
async fn get_with_params() {
    let req = Request::get(|ctx| {
        ctx.url("https://postman-echo.com/get?a=xxx&a=")?;
        ctx.param(|p| {
            p.add("a", "yyy").add("text", "hello world");
        });
        Ok(())
    })
    .unwrap();

    let json = echo(req).await;
    assert_eq!(json["args"]["a"], serde_json::json!(["xxx", "", "yyy"]));
    assert_eq!(json["args"]["text"], "hello world");
}

/// PUT with form body, custom header and cookies.
#[tokio::test]
#[ignore = "requires network access"]
async fn put_form_with_cookies() {
    let req = Request::put(|ctx| {
        ctx.scheme(httpctx::Scheme::Https)
            .host("postman-echo.com")
            .path("/put");
        ctx.param(|p| {
            p.add("arg", "iphone");
        });
        ctx.header(|h| {
            h.add("one", 42);
            h.cookie(|c| {
                c.add("aaa", "bbb").add("ccc", 42);
            });
        });
        ctx.body(|b| {
            b.form(|f| {
                f.add("login", "user").add("email", "john.doe@gmail.com");
            })
        })?;
        Ok(())
    })
    .unwrap();

    let json = echo(req).await;
    assert_eq!(json["args"]["arg"], "iphone");
    assert_eq!(json["headers"]["one"], "42");
    assert_eq!(json["headers"]["cookie"], "aaa=bbb; ccc=42");
    assert_eq!(json["form"]["login"], "user");
    assert_eq!(json["form"]["email"], "john.doe@gmail.com");
}

/// POST with a JSON body.
#[tokio::test]
#[ignore = "requires network access"]
async fn post_json() {
    let req = Request::post(|ctx| {
        ctx.url("https://postman-echo.com/post")?;
        ctx.body(|b| {
            b.json(|j| {
                j.add("login", "user").add("email", "john.doe@gmail.com");
            })
        })?;
        Ok(())
    })
    .unwrap();

    let json = echo(req).await;
    assert_eq!(json["json"]["login"], "user");
    assert_eq!(json["json"]["email"], "john.doe@gmail.com");
    assert_eq!(json["headers"]["content-type"], "application/json");
}
