//! Error types for the session layer.

use arena_protocol::ApiError;

use crate::LifecycleStatus;

/// Errors that can occur during session management.
///
/// Most failures inside the session are absorbed (a stale
/// identity is replaced, a failed roster fetch shows no heroes). What
/// remains here is what the caller must see.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation needs a `Ready` session. Bootstrap first.
    #[error("session is not ready (status: {0})")]
    NotReady(LifecycleStatus),

    /// Another bootstrap is running on this session.
    #[error("bootstrap already in progress")]
    BootstrapInProgress,

    /// Bootstrap could not provision a player even after falling back
    /// from the stored identity. The session is now `Errored`.
    #[error("bootstrap failed: {0}")]
    BootstrapFailed(#[source] ApiError),

    /// A hero field was empty after trimming whitespace. Raised before
    /// any request is made.
    #[error("hero {0} must not be empty")]
    InvalidHero(&'static str),

    /// A remote call failed and the failure is the caller's to handle.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    /// See [`ApiError::is_credential_rejected`].
    pub fn is_credential_rejected(&self) -> bool {
        match self {
            Self::Api(e) | Self::BootstrapFailed(e) => e.is_credential_rejected(),
            _ => false,
        }
    }
}
