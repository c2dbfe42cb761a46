//! Unified error type for the arena client.

use arena_fight::FightError;
use arena_protocol::{ApiError, DomainError, ProtocolError};
use arena_session::SessionError;
use arena_transport::{StoreError, TransportError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `arena` facade, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// No response from the server (connection, timeout, bad URL).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The credential file could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server refused the call.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A session operation failed (not ready, bootstrap, invalid hero).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A fight operation failed (unknown hero, already fighting).
    #[error(transparent)]
    Fight(#[from] FightError),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ArenaError {
    /// Returns `true` when the server no longer accepts our credential.
    pub fn is_credential_rejected(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_credential_rejected(),
            Self::Api(e) => e.is_credential_rejected(),
            Self::Session(e) => e.is_credential_rejected(),
            Self::Fight(e) => e.is_credential_rejected(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionFailed("gone".into());
        let arena_err: ArenaError = err.into();
        assert!(matches!(arena_err, ArenaError::Transport(_)));
        assert!(arena_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let arena_err: ArenaError = err.into();
        assert!(matches!(arena_err, ArenaError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::InvalidHero("title");
        let arena_err: ArenaError = err.into();
        assert!(matches!(arena_err, ArenaError::Session(_)));
        assert_eq!(arena_err.to_string(), "hero title must not be empty");
    }

    #[test]
    fn test_from_fight_error() {
        let err = FightError::AlreadyFighting(arena_protocol::HeroId::new("h1"));
        let arena_err: ArenaError = err.into();
        assert!(matches!(arena_err, ArenaError::Fight(_)));
        assert!(!arena_err.is_credential_rejected());
    }

    #[test]
    fn test_credential_rejected_through_layers() {
        let rejected = DomainError::RemoteRejected {
            status: 403,
            reason: "Forbidden".into(),
        };
        let api: ApiError = rejected.into();
        let arena_err: ArenaError = FightError::Api(api).into();
        assert!(arena_err.is_credential_rejected());
    }
}
