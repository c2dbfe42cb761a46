//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. This keeps
//! errors specific and meaningful: a [`DomainError`] means the server
//! answered and said no, a [`TransportError`] means no answer arrived.

use arena_transport::TransportError;

/// Errors from turning values into bytes and back.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error` impl;
/// each `#[error("...")]` is the message shown in logs.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of a request body failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A response body could not be parsed into the expected type.
    /// Common causes: an HTML error page instead of JSON, missing fields,
    /// or an outcome code outside 0..=2.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is structurally wrong for the operation, e.g. a
    /// credential was requested for a body that is not a JSON object.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// The server (or the local credential check) refused the operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// The endpoint needs a credential and none is available. Raised
    /// locally; no request was sent.
    #[error("not authenticated: no player credential available")]
    Unauthenticated,

    /// The server answered 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with another non-2xx status.
    #[error("rejected by server ({status}): {reason}")]
    RemoteRejected { status: u16, reason: String },
}

impl DomainError {
    /// Returns `true` when the failure means our credential is missing or
    /// no longer accepted, so a fresh identity is the only way forward.
    pub fn is_credential_rejected(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::RemoteRejected {
                    status: 401 | 403,
                    ..
                }
        )
    }
}

/// Everything that can go wrong with one API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response arrived but its body was malformed (or the request body
    /// could not be built).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server, or the local credential check, refused the call.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    /// The domain error, if this is one.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` for a 404 from the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotFound(_)))
    }

    /// See [`DomainError::is_credential_rejected`].
    pub fn is_credential_rejected(&self) -> bool {
        self.domain().is_some_and(DomainError::is_credential_rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_rejected_for_401_and_403() {
        let unauthorized = DomainError::RemoteRejected {
            status: 401,
            reason: "Unauthorized".into(),
        };
        let forbidden = DomainError::RemoteRejected {
            status: 403,
            reason: "Forbidden".into(),
        };
        assert!(unauthorized.is_credential_rejected());
        assert!(forbidden.is_credential_rejected());
        assert!(DomainError::Unauthenticated.is_credential_rejected());
    }

    #[test]
    fn test_credential_not_rejected_for_other_statuses() {
        let bad_request = DomainError::RemoteRejected {
            status: 400,
            reason: "Title is required".into(),
        };
        assert!(!bad_request.is_credential_rejected());
        assert!(!DomainError::NotFound("Hero not found".into()).is_credential_rejected());
    }

    #[test]
    fn test_api_error_helpers() {
        let err: ApiError = DomainError::NotFound("Player not found".into()).into();
        assert!(err.is_not_found());
        assert!(!err.is_credential_rejected());

        let err: ApiError = TransportError::ConnectionFailed("refused".into()).into();
        assert!(err.domain().is_none());
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_remote_rejected_message_includes_status_and_reason() {
        let err = DomainError::RemoteRejected {
            status: 500,
            reason: "Internal server error".into(),
        };
        assert_eq!(
            err.to_string(),
            "rejected by server (500): Internal server error"
        );
    }
}
