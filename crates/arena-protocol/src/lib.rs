//! Wire protocol for the hero arena.
//!
//! This crate defines the "language" the client speaks with the arena API:
//!
//! - **Types** ([`Player`], [`Hero`], [`Fight`], [`FightResult`], ...) —
//!   the JSON documents the server sends and accepts.
//! - **Endpoints** ([`Endpoint`], [`AuthMode`]) — every remote operation,
//!   with its method, path, and credential requirement.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how bodies are converted
//!   to/from bytes.
//! - **Client** ([`ApiClient`]) — attaches credentials, executes a request
//!   through a [`Transport`](arena_transport::Transport), and classifies
//!   the response.
//! - **Errors** ([`ApiError`], [`DomainError`], [`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Session / Fight (state) → Protocol (Endpoint, ApiClient) → Transport (bytes)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod client;
mod codec;
mod endpoint;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiClient, SECRET_FIELD};
pub use codec::{Codec, JsonCodec};
pub use endpoint::{AuthMode, DEFAULT_PAGE_LIMIT, Endpoint};
pub use error::{ApiError, DomainError, ProtocolError};
pub use types::{
    CreateHeroRequest, CreatePlayerRequest, Fight, FightId, FightOutcome,
    FightPage, FightResult, Hero, HeroId, Player, PlayerId, SecretToken,
};
