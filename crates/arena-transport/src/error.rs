use std::time::Duration;

/// Errors that can occur in the transport layer.
///
/// Every variant means "no usable response was obtained". A server that
/// answers with an error status is not a transport error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be delivered (DNS, refused, reset, TLS).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response started but its body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// No response arrived within the configured deadline.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    /// The configured base URL is not a valid absolute URL.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a [`CredentialStore`](crate::CredentialStore) that
/// persists to disk.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("credential store io failed: {0}")]
    Io(#[source] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("credential store is corrupt: {0}")]
    Format(#[source] serde_json::Error),
}
