//! Fight orchestration for the hero arena client.
//!
//! A fight is a single request: the client asks the server to match one of
//! its heroes against an opponent, and the server answers with the outcome
//! and the attacker's rating change. This crate wraps that request with the
//! bookkeeping the client needs:
//!
//! - only heroes in the current roster may fight
//! - a hero with a fight in flight can't start another one
//! - the rating change lands on exactly one roster entry
//!
//! It also reads fight history, page by page.
//!
//! # Key types
//!
//! - [`FightOrchestrator`] — starts fights and reads history
//! - [`FightReport`] — what a finished fight did to the roster
//! - [`FightHistory`] — a cursor-following pager over a hero's fights
//! - [`FightConfig`] — page size settings

mod config;
mod error;
mod history;
mod orchestrator;

pub use config::FightConfig;
pub use error::FightError;
pub use history::FightHistory;
pub use orchestrator::{FightOrchestrator, FightReport};
