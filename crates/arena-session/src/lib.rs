//! Player session management for the hero arena client.
//!
//! This crate owns the client's identity and hero state:
//!
//! 1. **Bootstrap** — recover the player remembered in the
//!    [`CredentialStore`](arena_transport::CredentialStore), or provision a
//!    new anonymous one ([`SessionManager::bootstrap`])
//! 2. **Roster** — keep the authoritative list of the player's heroes,
//!    replaced wholesale on every refresh
//! 3. **Hero creation and selection**
//!
//! # How it fits in the stack
//!
//! ```text
//! Fight Layer (above)  ← reads the roster, applies rating changes
//!     ↕
//! Session Layer (this crate)  ← owns Player, Hero[], lifecycle status
//!     ↕
//! Protocol Layer (below)  ← Endpoint, ApiClient, wire types
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{LifecycleStatus, SessionConfig, SessionState};
