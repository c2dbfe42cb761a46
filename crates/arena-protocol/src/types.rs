//! Core protocol types for the arena's JSON documents.
//!
//! The server serializes its records with Go-style field names (`ID`,
//! `UserName`, `Elo`, ...). Each Rust field carries a `#[serde(rename)]`
//! so the rest of the client can use idiomatic names while the wire
//! format stays exactly what the server emits. Unknown fields such as
//! `DeletedAt` are ignored on decode.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-issued identifier of a player (a UUID string).
///
/// A "newtype wrapper" around `String`: you can't pass a `HeroId` where a
/// `PlayerId` is expected even though both are strings underneath.
/// `#[serde(transparent)]` keeps the JSON a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

/// Server-issued identifier of a hero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeroId(String);

/// Server-issued identifier of a fight. Also the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FightId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(PlayerId);
string_id!(HeroId);
string_id!(FightId);

// ---------------------------------------------------------------------------
// SecretToken
// ---------------------------------------------------------------------------

/// The player's opaque authentication secret.
///
/// It is never displayed: `Debug` prints a placeholder, and there is no
/// `Display` impl. Code that must put it on the wire calls
/// [`expose`](Self::expose).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for attaching to a request or persisting.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the server sent no secret (e.g. a player embedded
    /// in a hero response).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("SecretToken(<empty>)")
        } else {
            f.write_str("SecretToken(<redacted>)")
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// An anonymous player identity.
///
/// Created once per client installation by `POST /player`. Only the
/// creation response is guaranteed to carry the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "ID")]
    pub id: PlayerId,

    #[serde(rename = "UserName")]
    pub display_name: String,

    /// Disambiguates players sharing a display name (`Name#1234`).
    #[serde(rename = "UserNameSuffix", default)]
    pub display_discriminator: u32,

    #[serde(rename = "Secret", default)]
    pub secret_token: SecretToken,
}

impl Player {
    /// The public handle, `display_name#discriminator`.
    pub fn handle(&self) -> String {
        format!("{}#{}", self.display_name, self.display_discriminator)
    }
}

// ---------------------------------------------------------------------------
// Hero
// ---------------------------------------------------------------------------

/// A text-described fighter owned by one player.
///
/// Ownership is the `owner_player_id` back-reference. Some responses also
/// embed the owner as `player`; that copy is informational and may lack
/// the secret.
///
/// The same type is used for the attacker/defender snapshots inside a
/// [`Fight`], where `rating` is frozen at fight time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    #[serde(rename = "ID")]
    pub id: HeroId,

    #[serde(rename = "PlayerID")]
    pub owner_player_id: PlayerId,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Description")]
    pub description: String,

    /// Assigned by the server from the creator's location.
    #[serde(rename = "Country", default)]
    pub country: String,

    /// ELO-style rating.
    #[serde(rename = "Elo")]
    pub rating: u32,

    #[serde(rename = "Player", default, skip_serializing_if = "Option::is_none")]
    pub player: Option<Player>,
}

// ---------------------------------------------------------------------------
// Fight
// ---------------------------------------------------------------------------

/// How a fight ended, from the attacker's point of view.
///
/// On the wire this is a bare integer: `0` draw, `1` victory, `2` defeat.
/// `try_from`/`into` route serde through the `u8` conversions below, so an
/// out-of-range code is a decode error instead of a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FightOutcome {
    Draw,
    Victory,
    Defeat,
}

impl TryFrom<u8> for FightOutcome {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Draw),
            1 => Ok(Self::Victory),
            2 => Ok(Self::Defeat),
            other => Err(format!("unknown fight outcome code {other}")),
        }
    }
}

impl From<FightOutcome> for u8 {
    fn from(outcome: FightOutcome) -> Self {
        match outcome {
            FightOutcome::Draw => 0,
            FightOutcome::Victory => 1,
            FightOutcome::Defeat => 2,
        }
    }
}

impl fmt::Display for FightOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draw => write!(f, "Draw"),
            Self::Victory => write!(f, "Victory"),
            Self::Defeat => write!(f, "Defeat"),
        }
    }
}

/// A resolved fight. Created once, server-side, and immutable afterwards.
///
/// `attacker` and `defender` are snapshots: their `rating` is the value at
/// fight time, not the hero's current rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fight {
    #[serde(rename = "ID")]
    pub id: FightId,

    #[serde(rename = "AttackerID")]
    pub attacker_hero_id: HeroId,

    #[serde(rename = "Attacker")]
    pub attacker: Hero,

    #[serde(rename = "DefenderID")]
    pub defender_hero_id: HeroId,

    #[serde(rename = "Defender")]
    pub defender: Hero,

    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "Outcome")]
    pub outcome: FightOutcome,

    /// The generated fight story. May be empty.
    #[serde(rename = "Transcript", default)]
    pub narrative: String,
}

/// Response of `POST /hero/{id}/fight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightResult {
    pub fight: Fight,
    pub victory: bool,
    /// Signed rating change for the attacker.
    pub elo_gain: i32,
}

/// One page of `GET /hero/{id}/fights`, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightPage {
    #[serde(default)]
    pub fights: Vec<Fight>,
    #[serde(default)]
    pub has_more: bool,
    /// Pass back as `last_id` to get the next page.
    #[serde(default)]
    pub next_cursor: Option<FightId>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /player`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    pub username: String,
}

/// Body of `POST /hero`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHeroRequest {
    pub title: String,
    pub description: String,
}

// =========================================================================
// Tests
// =========================================================================
