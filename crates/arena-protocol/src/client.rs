//! The API client: one call in, one classified result out.
//!
//! [`ApiClient::send`] is the only path from the client core to the
//! network. For every call it:
//!
//! 1. decides from the endpoint's [`AuthMode`] whether a credential is
//!    needed, and refuses locally when it is needed but unavailable;
//! 2. merges the session's secret into the JSON body under [`SECRET_FIELD`];
//! 3. forwards the stored identity as cookies (same-origin behavior);
//! 4. executes the request, bounded by the optional timeout;
//! 5. classifies the response into success, [`DomainError`], or
//!    transport failure.
//!
//! It never retries. Retry policy belongs to callers.

use std::sync::Arc;
use std::time::Duration;

use arena_transport::{
    CredentialStore, HttpRequest, HttpResponse, PLAYER_SECRET_KEY, Transport,
    TransportError,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    ApiError, AuthMode, Codec, DomainError, Endpoint, JsonCodec, ProtocolError,
    SecretToken,
};

/// Reserved body field carrying the player secret.
pub const SECRET_FIELD: &str = "_secret";

/// Executes [`Endpoint`]s through a [`Transport`].
///
/// The secret is passed in per call by the session layer rather than read
/// from the store here: the session's in-memory player is the authority
/// on which identity is current, so a stale store can't leak into a body.
/// The store is only read for cookie forwarding.
pub struct ApiClient<T: Transport, S: CredentialStore, C: Codec = JsonCodec> {
    transport: T,
    store: Arc<S>,
    codec: C,
    timeout: Option<Duration>,
}

impl<T: Transport, S: CredentialStore> ApiClient<T, S, JsonCodec> {
    /// Creates a JSON client with no request timeout.
    pub fn new(transport: T, store: Arc<S>) -> Self {
        Self {
            transport,
            store,
            codec: JsonCodec,
            timeout: None,
        }
    }
}

impl<T: Transport, S: CredentialStore, C: Codec> ApiClient<T, S, C> {
    /// Bounds every call. `None` waits for the transport's own limits.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The credential store shared with the session layer.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes `endpoint` and decodes a successful body as `R`.
    pub async fn request<R: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        body: Option<Value>,
        secret: Option<&SecretToken>,
    ) -> Result<R, ApiError> {
        let bytes = self.send(endpoint, body, secret).await?;
        Ok(self.codec.decode(&bytes)?)
    }

    /// Executes `endpoint` and returns the raw successful body.
    ///
    /// # Errors
    /// - [`DomainError::Unauthenticated`] — the endpoint requires a
    ///   credential and neither `secret` nor a stored cookie secret exists.
    ///   No request is made.
    /// - [`DomainError::NotFound`] / [`DomainError::RemoteRejected`] — the
    ///   server answered with a non-2xx status.
    /// - [`ApiError::Transport`] — no response (including timeout).
    /// - [`ApiError::Protocol`] — the body could not be built.
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        body: Option<Value>,
        secret: Option<&SecretToken>,
    ) -> Result<Vec<u8>, ApiError> {
        let auth = endpoint.auth();
        let secret = secret.filter(|s| !s.is_empty());

        let cookies = if auth.sends_cookies() {
            self.store.entries()
        } else {
            Vec::new()
        };

        if auth == AuthMode::Required
            && secret.is_none()
            && !cookies.iter().any(|(name, _)| name == PLAYER_SECRET_KEY)
        {
            tracing::debug!(endpoint = endpoint.name(), "no credential, request refused locally");
            return Err(DomainError::Unauthenticated.into());
        }

        let body = match secret {
            Some(secret) if auth.attaches_secret() => Some(attach_secret(body, secret)?),
            _ => body,
        };

        let mut request = HttpRequest::new(endpoint.method(), endpoint.path());
        request.cookies = cookies;
        if let Some(body) = body {
            request = request.with_body(self.codec.encode(&body)?);
        }

        tracing::debug!(
            endpoint = endpoint.name(),
            method = %request.method,
            path = %request.path,
            "sending request"
        );

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.execute(request))
                .await
                .map_err(|_| TransportError::TimedOut(limit))??,
            None => self.transport.execute(request).await?,
        };

        classify(endpoint, response)
    }
}

/// Merges the secret into a JSON object body, creating one if needed.
fn attach_secret(body: Option<Value>, secret: &SecretToken) -> Result<Value, ProtocolError> {
    let mut object = match body {
        None => Map::new(),
        Some(Value::Object(object)) => object,
        Some(other) => {
            return Err(ProtocolError::InvalidMessage(format!(
                "credential needs an object body, got {other}"
            )));
        }
    };
    object.insert(
        SECRET_FIELD.to_string(),
        Value::String(secret.expose().to_string()),
    );
    Ok(Value::Object(object))
}

fn classify(endpoint: &Endpoint, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }

    let reason = reason_of(&response);
    tracing::debug!(
        endpoint = endpoint.name(),
        status = response.status,
        %reason,
        "request rejected"
    );

    let err = match response.status {
        404 => DomainError::NotFound(reason),
        status => DomainError::RemoteRejected { status, reason },
    };
    Err(err.into())
}

/// Human-readable reason: the server's plain-text error, or the status.
fn reason_of(response: &HttpResponse) -> String {
    let text = response.text();
    let text = text.trim();
    if text.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_attach_secret_creates_object_when_no_body() {
        let body = attach_secret(None, &SecretToken::new("s1")).unwrap();
        assert_eq!(body, json!({"_secret": "s1"}));
    }

    #[test]
    fn test_attach_secret_merges_into_existing_object() {
        let body = attach_secret(
            Some(json!({"title": "T", "description": "D"})),
            &SecretToken::new("s1"),
        )
        .unwrap();
        assert_eq!(body, json!({"title": "T", "description": "D", "_secret": "s1"}));
    }

    #[test]
    fn test_attach_secret_rejects_non_object() {
        let result = attach_secret(Some(json!([1, 2])), &SecretToken::new("s1"));
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_reason_of_trims_text_and_falls_back_to_status() {
        let with_text = HttpResponse {
            status: 404,
            body: b"Player not found\n".to_vec(),
        };
        assert_eq!(reason_of(&with_text), "Player not found");

        let empty = HttpResponse {
            status: 502,
            body: Vec::new(),
        };
        assert_eq!(reason_of(&empty), "HTTP 502");
    }
}
