//! # Arena
//!
//! Client core for the hero arena: a browser-style game where anonymous
//! players create text-described heroes and send them into server-resolved
//! fights.
//!
//! The client keeps one anonymous identity per installation, a roster of
//! that player's heroes, and applies fight rating changes to the roster as
//! fights finish. Everything below the view is here:
//!
//! ```text
//! View (your code)
//!   ↕
//! ArenaClient  ← this crate
//!   ↕
//! SessionManager / FightOrchestrator  ← arena-session, arena-fight
//!   ↕
//! ApiClient  ← arena-protocol
//!   ↕
//! Transport + CredentialStore  ← arena-transport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arena::prelude::*;
//!
//! # async fn run() -> Result<(), ArenaError> {
//! arena::init_tracing();
//!
//! let client = ArenaClient::builder()
//!     .config(ClientConfig::from_env()?)
//!     .build()?;
//! client.bootstrap().await?;
//!
//! let hero = client.create_hero("Musashi", "A wandering swordsman").await?;
//! let report = client.start_fight(&hero.id).await?;
//! println!("{} ({:+})", report.fight.outcome, report.rating_delta);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::{ArenaClient, ArenaClientBuilder};
pub use config::{ClientConfig, ENV_PREFIX};
pub use error::ArenaError;

pub use arena_fight as fight;
pub use arena_protocol as protocol;
pub use arena_session as session;
pub use arena_transport as transport;

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Does nothing if a global subscriber is already set, so it is safe to
/// call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Everything a view usually needs, in one import.
pub mod prelude {
    pub use crate::{ArenaClient, ArenaClientBuilder, ArenaError, ClientConfig};
    pub use arena_fight::{FightConfig, FightError, FightHistory, FightReport};
    pub use arena_protocol::{
        Fight, FightId, FightOutcome, FightPage, Hero, HeroId, Player, PlayerId,
    };
    pub use arena_session::{LifecycleStatus, SessionConfig, SessionError, SessionState};
    pub use arena_transport::{
        CredentialStore, FileCredentialStore, HttpTransport, MemoryCredentialStore,
        Transport,
    };
}
