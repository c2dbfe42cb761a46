//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, COOKIE};

use crate::{HttpRequest, HttpResponse, Method, Transport, TransportError};

/// An HTTP-based [`Transport`] that talks to one API base URL.
///
/// Cloning is cheap: the underlying `reqwest::Client` keeps its connection
/// pool behind an `Arc`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport for the given base URL, e.g.
    /// `http://127.0.0.1:8080/api`.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, None)
    }

    /// Creates a transport whose requests fail with
    /// [`TransportError::TimedOut`] once `timeout` elapses.
    pub fn with_timeout(
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "{base_url}: scheme must be http or https"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!(%base_url, "HTTP transport ready");
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Returns the base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.url_for(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &url);
        if let Some(cookie) = request.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::TimedOut(self.timeout.unwrap_or_default())
            } else {
                TransportError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?
            .to_vec();

        tracing::debug!(method = %request.method, %url, status, "request completed");
        Ok(HttpResponse { status, body })
    }
}
