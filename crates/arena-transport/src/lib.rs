//! Transport abstraction layer for the hero arena client.
//!
//! Provides the [`Transport`] trait that abstracts over how a request
//! reaches the arena API, plus the [`CredentialStore`] the client uses to
//! remember its identity between runs.
//!
//! # Feature Flags
//!
//! - `http` (default) — HTTP transport via `reqwest`
//! - `test-util` — [`MockTransport`], a scripted in-memory transport

#![allow(async_fn_in_trait)]

mod credential;
mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(any(test, feature = "test-util"))]
mod mock;

pub use credential::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore,
    PLAYER_ID_KEY, PLAYER_SECRET_KEY,
};
pub use error::{StoreError, TransportError};
#[cfg(feature = "http")]
pub use http::HttpTransport;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockReply, MockTransport};

use std::fmt;
use std::future::Future;

/// HTTP method of an outgoing request.
///
/// The arena API only uses two verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Returns the canonical upper-case verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as it goes out on the wire.
///
/// `path` is relative to the transport's base URL and may carry a query
/// string. `cookies` are forwarded as a single `Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
    pub cookies: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a request with no body and no cookies.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            cookies: Vec::new(),
        }
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a cookie.
    pub fn with_cookie(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// The path without its query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// Renders the cookies as a `Cookie` header value, `None` if empty.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }
}

/// A response with its status code and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes requests against the remote arena API.
///
/// A transport only moves bytes: it performs no retries and does not
/// interpret status codes. Classifying responses belongs to the protocol
/// layer above.
pub trait Transport: Send + Sync + 'static {
    /// Sends the request and waits for the full response.
    ///
    /// Returns `Err` only when no response was obtained (connection
    /// failure, timeout, unreadable body). Any HTTP status, including
    /// 4xx/5xx, is an `Ok`.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[test]
    fn test_request_route_strips_query() {
        let req = HttpRequest::new(Method::Get, "/hero/h1/fights?limit=20");
        assert_eq!(req.route(), "/hero/h1/fights");

        let req = HttpRequest::new(Method::Get, "/hero/h1");
        assert_eq!(req.route(), "/hero/h1");
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let req = HttpRequest::new(Method::Get, "/player/p1")
            .with_cookie("player_id", "p1")
            .with_cookie("player_secret", "s3cret");
        assert_eq!(
            req.cookie_header().as_deref(),
            Some("player_id=p1; player_secret=s3cret")
        );
    }

    #[test]
    fn test_cookie_header_none_when_empty() {
        let req = HttpRequest::new(Method::Post, "/player");
        assert!(req.cookie_header().is_none());
    }

    #[test]
    fn test_response_is_success_covers_2xx_only() {
        let ok = HttpResponse { status: 201, body: vec![] };
        let missing = HttpResponse { status: 404, body: vec![] };
        let redirect = HttpResponse { status: 302, body: vec![] };
        assert!(ok.is_success());
        assert!(!missing.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_response_text_is_lossy() {
        let resp = HttpResponse {
            status: 400,
            body: b"Invalid player _secret\n".to_vec(),
        };
        assert_eq!(resp.text(), "Invalid player _secret\n");
    }
}
