//! Session types: the data the client keeps about "who am I, and what do
//! I own".
//!
//! A session tracks:
//! - WHO the player is (`Player`, including the secret)
//! - WHAT heroes they own (the roster)
//! - WHICH hero the view is focused on (the selection)
//! - WHERE the session is in its lifecycle

use std::fmt;

use arena_protocol::{Hero, HeroId, Player};
use rand::Rng;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prefix of the generated display name for new players. A random
    /// number is appended, so the default yields names like `Player4821907`.
    pub username_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username_prefix: "Player".to_string(),
        }
    }
}

impl SessionConfig {
    /// Generates a default display name for a freshly provisioned player.
    ///
    /// The server disambiguates collisions with its own suffix, so this
    /// only needs to look reasonable, not be unique.
    pub fn generate_username(&self) -> String {
        let number: u32 = rand::rng().random_range(1_000_000..10_000_000);
        format!("{}{number}", self.username_prefix)
    }
}

// ---------------------------------------------------------------------------
// LifecycleStatus
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///   Uninitialized ──(bootstrap)──→ Bootstrapping ──→ Ready
///                                        │
///                                        └──(recovery failed)──→ Errored
/// ```
///
/// `Errored` is left only by calling bootstrap again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LifecycleStatus {
    #[default]
    Uninitialized,
    Bootstrapping,
    Ready,
    Errored { reason: String },
}

impl LifecycleStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Bootstrapping => write!(f, "Bootstrapping"),
            Self::Ready => write!(f, "Ready"),
            Self::Errored { reason } => write!(f, "Errored: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// A point-in-time copy of the session, for the view to render from.
///
/// Invariant kept by [`SessionManager`](crate::SessionManager): every hero
/// in `roster` has `owner_player_id == player.id`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub player: Option<Player>,
    pub roster: Vec<Hero>,
    pub selected_hero: Option<Hero>,
    pub status: LifecycleStatus,
}

impl SessionState {
    /// Looks up a roster entry by id.
    pub fn hero(&self, id: &HeroId) -> Option<&Hero> {
        self.roster.iter().find(|h| &h.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_username_uses_prefix_and_digits() {
        let config = SessionConfig::default();
        let name = config.generate_username();

        let digits = name.strip_prefix("Player").expect("default prefix");
        assert_eq!(digits.len(), 7);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_username_custom_prefix() {
        let config = SessionConfig {
            username_prefix: "Gladiator".into(),
        };
        assert!(config.generate_username().starts_with("Gladiator"));
    }

    #[test]
    fn test_lifecycle_default_is_uninitialized() {
        assert_eq!(LifecycleStatus::default(), LifecycleStatus::Uninitialized);
        assert!(!LifecycleStatus::default().is_ready());
        assert!(LifecycleStatus::Ready.is_ready());
    }

    #[test]
    fn test_lifecycle_display() {
        assert_eq!(LifecycleStatus::Bootstrapping.to_string(), "Bootstrapping");
        let errored = LifecycleStatus::Errored {
            reason: "connection refused".into(),
        };
        assert_eq!(errored.to_string(), "Errored: connection refused");
    }

    #[test]
    fn test_state_default_is_empty() {
        let state = SessionState::default();
        assert!(state.player.is_none());
        assert!(state.roster.is_empty());
        assert!(state.hero(&HeroId::new("h1")).is_none());
    }
}
