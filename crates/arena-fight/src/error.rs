//! Error types for the fight layer.

use arena_protocol::{ApiError, HeroId};
use arena_session::{LifecycleStatus, SessionError};

/// Errors that can occur when starting fights or reading fight history.
#[derive(Debug, thiserror::Error)]
pub enum FightError {
    /// Fights need a bootstrapped session.
    #[error("session is not ready (status: {0})")]
    SessionNotReady(LifecycleStatus),

    /// The hero is not in the current player's roster.
    #[error("hero {0} is not in the roster")]
    UnknownHero(HeroId),

    /// The hero already has a fight in flight. Rejected locally; no
    /// request was sent.
    #[error("hero {0} is already fighting")]
    AlreadyFighting(HeroId),

    /// The fight request itself failed. Nothing was changed locally.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl FightError {
    /// See [`ApiError::is_credential_rejected`].
    pub fn is_credential_rejected(&self) -> bool {
        match self {
            Self::Api(e) => e.is_credential_rejected(),
            Self::Session(e) => e.is_credential_rejected(),
            _ => false,
        }
    }
}
