//! Client configuration.
//!
//! Every field has a default, so `ClientConfig::default()` talks to a
//! local server. [`ClientConfig::from_env`] layers the environment over
//! the defaults with figment:
//!
//! | Variable | Field | Example |
//! |---|---|---|
//! | `ARENA_BASE_URL` | `base_url` | `https://arena.example.com` |
//! | `ARENA_TIMEOUT_SECS` | `timeout_secs` | `10` (`0` disables) |
//! | `ARENA_CREDENTIALS_PATH` | `credentials_path` | `~/.arena.json` |
//! | `ARENA_USERNAME_PREFIX` | `username_prefix` | `Gladiator` |
//! | `ARENA_PAGE_LIMIT` | `page_limit` | `50` |

use std::path::PathBuf;
use std::time::Duration;

use arena_fight::FightConfig;
use arena_session::SessionConfig;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::ArenaError;

/// Prefix shared by every environment variable the client reads.
pub const ENV_PREFIX: &str = "ARENA_";

/// Everything needed to build an [`ArenaClient`](crate::ArenaClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the arena API, e.g. `http://localhost:5080`.
    pub base_url: String,

    /// Upper bound on every request, in seconds. `0` waits indefinitely.
    pub timeout_secs: u64,

    /// Where the player identity is remembered between runs.
    pub credentials_path: PathBuf,

    /// Prefix for generated player names.
    pub username_prefix: String,

    /// Fights per history page.
    pub page_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        let fight = FightConfig::default();
        Self {
            base_url: "http://localhost:5080".to_string(),
            timeout_secs: 30,
            credentials_path: PathBuf::from(".arena-credentials.json"),
            username_prefix: session.username_prefix,
            page_limit: fight.page_limit,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the `ARENA_*` environment variables.
    ///
    /// # Errors
    /// [`ArenaError::Config`] if a variable doesn't fit its field, e.g.
    /// `ARENA_TIMEOUT_SECS=soon`.
    pub fn from_env() -> Result<Self, ArenaError> {
        Self::from_figment(&Self::figment())
    }

    /// The layered sources behind [`from_env`](Self::from_env): defaults,
    /// then the environment. Merge more providers on top before
    /// extracting.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ArenaError> {
        figment
            .extract()
            .map_err(|e| ArenaError::Config(format!("failed to load configuration: {e}")))
    }

    /// The request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            username_prefix: self.username_prefix.clone(),
        }
    }

    pub fn fight_config(&self) -> FightConfig {
        FightConfig {
            page_limit: self.page_limit,
        }
    }
}
