//! The arena API's operation table.
//!
//! Every remote call the client can make is one [`Endpoint`] variant. The
//! variant knows its HTTP method, its path (with ids and query filled in),
//! and how it must be authenticated, so none of that is repeated at call
//! sites.

use arena_transport::Method;
use url::form_urlencoded;

use crate::{FightId, HeroId, PlayerId};

/// Page size used when the caller doesn't pick one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// How an endpoint is authenticated.
///
/// ```text
/// None        no cookies, no secret           (POST /player)
/// Optional    cookies, secret if we have one  (POST /hero)
/// Required    cookies, secret; refuse locally if neither exists
/// CookieOnly  cookies, never the body secret  (images, fight history)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    None,
    Optional,
    Required,
    CookieOnly,
}

impl AuthMode {
    /// Whether the `_secret` body field may be attached.
    pub fn attaches_secret(self) -> bool {
        matches!(self, Self::Optional | Self::Required)
    }

    /// Whether stored cookies are forwarded.
    pub fn sends_cookies(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// One remote operation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /player`
    CreatePlayer,
    /// `GET /player/{id}`
    GetPlayer(PlayerId),
    /// `GET /player/{id}/heroes`
    PlayerHeroes(PlayerId),
    /// `POST /hero`
    CreateHero,
    /// `GET /hero/{id}`
    GetHero(HeroId),
    /// `GET /hero/{id}/image`
    HeroImage(HeroId),
    /// `POST /hero/{id}/fight`
    StartFight(HeroId),
    /// `GET /hero/{id}/fights?last_id&limit`
    HeroFights {
        hero_id: HeroId,
        last_id: Option<FightId>,
        limit: u32,
    },
    /// `GET /hero/{id}/fight/{fight_id}`
    GetFight { hero_id: HeroId, fight_id: FightId },
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Self::CreatePlayer | Self::CreateHero | Self::StartFight(_) => Method::Post,
            _ => Method::Get,
        }
    }

    /// The path relative to the API base, including any query string.
    ///
    /// Ids are percent-encoded, so an id can never add path segments or
    /// start a query.
    pub fn path(&self) -> String {
        match self {
            Self::CreatePlayer => "/player".to_string(),
            Self::GetPlayer(id) => format!("/player/{}", encode(id.as_str())),
            Self::PlayerHeroes(id) => format!("/player/{}/heroes", encode(id.as_str())),
            Self::CreateHero => "/hero".to_string(),
            Self::GetHero(id) => format!("/hero/{}", encode(id.as_str())),
            Self::HeroImage(id) => format!("/hero/{}/image", encode(id.as_str())),
            Self::StartFight(id) => format!("/hero/{}/fight", encode(id.as_str())),
            Self::HeroFights {
                hero_id,
                last_id,
                limit,
            } => {
                let hero_id = encode(hero_id.as_str());
                match last_id {
                    Some(last_id) => format!(
                        "/hero/{hero_id}/fights?last_id={}&limit={limit}",
                        encode(last_id.as_str())
                    ),
                    None => format!("/hero/{hero_id}/fights?limit={limit}"),
                }
            }
            Self::GetFight { hero_id, fight_id } => format!(
                "/hero/{}/fight/{}",
                encode(hero_id.as_str()),
                encode(fight_id.as_str())
            ),
        }
    }

    pub fn auth(&self) -> AuthMode {
        match self {
            Self::CreatePlayer => AuthMode::None,
            Self::CreateHero => AuthMode::Optional,
            Self::GetPlayer(_)
            | Self::PlayerHeroes(_)
            | Self::GetHero(_)
            | Self::StartFight(_) => AuthMode::Required,
            Self::HeroImage(_) | Self::HeroFights { .. } | Self::GetFight { .. } => {
                AuthMode::CookieOnly
            }
        }
    }

    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreatePlayer => "create_player",
            Self::GetPlayer(_) => "get_player",
            Self::PlayerHeroes(_) => "player_heroes",
            Self::CreateHero => "create_hero",
            Self::GetHero(_) => "get_hero",
            Self::HeroImage(_) => "hero_image",
            Self::StartFight(_) => "start_fight",
            Self::HeroFights { .. } => "hero_fights",
            Self::GetFight { .. } => "get_fight",
        }
    }
}

/// Percent-encodes one path segment or query value.
fn encode(raw: &str) -> String {
    // byte_serialize writes a space as `+`; a literal `+` comes out as `%2B`.
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_and_methods_match_api_table() {
        let h = HeroId::new("h1");
        let p = PlayerId::new("p1");

        let cases = [
            (Endpoint::CreatePlayer, Method::Post, "/player"),
            (Endpoint::GetPlayer(p.clone()), Method::Get, "/player/p1"),
            (Endpoint::PlayerHeroes(p), Method::Get, "/player/p1/heroes"),
            (Endpoint::CreateHero, Method::Post, "/hero"),
            (Endpoint::GetHero(h.clone()), Method::Get, "/hero/h1"),
            (Endpoint::HeroImage(h.clone()), Method::Get, "/hero/h1/image"),
            (Endpoint::StartFight(h.clone()), Method::Post, "/hero/h1/fight"),
            (
                Endpoint::GetFight {
                    hero_id: h,
                    fight_id: FightId::new("f9"),
                },
                Method::Get,
                "/hero/h1/fight/f9",
            ),
        ];

        for (endpoint, method, path) in cases {
            assert_eq!(endpoint.method(), method, "{}", endpoint.name());
            assert_eq!(endpoint.path(), path, "{}", endpoint.name());
        }
    }

    #[test]
    fn test_hero_fights_query_with_and_without_cursor() {
        let first = Endpoint::HeroFights {
            hero_id: HeroId::new("h1"),
            last_id: None,
            limit: DEFAULT_PAGE_LIMIT,
        };
        assert_eq!(first.path(), "/hero/h1/fights?limit=20");

        let next = Endpoint::HeroFights {
            hero_id: HeroId::new("h1"),
            last_id: Some(FightId::new("f20")),
            limit: 5,
        };
        assert_eq!(next.path(), "/hero/h1/fights?last_id=f20&limit=5");
    }

    #[test]
    fn test_path_encodes_reserved_characters_in_ids() {
        assert_eq!(
            Endpoint::StartFight(HeroId::new("a/b")).path(),
            "/hero/a%2Fb/fight"
        );
        assert_eq!(
            Endpoint::GetPlayer(PlayerId::new("p 1?x#y")).path(),
            "/player/p%201%3Fx%23y"
        );
        let page = Endpoint::HeroFights {
            hero_id: HeroId::new("h1"),
            last_id: Some(FightId::new("f&limit=999")),
            limit: 5,
        };
        assert_eq!(page.path(), "/hero/h1/fights?last_id=f%26limit%3D999&limit=5");
        assert_eq!(
            Endpoint::GetHero(HeroId::new("0f3c-9a.x_y")).path(),
            "/hero/0f3c-9a.x_y"
        );
    }

    #[test]
    fn test_auth_modes() {
        assert_eq!(Endpoint::CreatePlayer.auth(), AuthMode::None);
        assert_eq!(Endpoint::CreateHero.auth(), AuthMode::Optional);
        assert_eq!(
            Endpoint::StartFight(HeroId::new("h1")).auth(),
            AuthMode::Required
        );
        assert_eq!(
            Endpoint::HeroImage(HeroId::new("h1")).auth(),
            AuthMode::CookieOnly
        );

        assert!(!AuthMode::None.sends_cookies());
        assert!(AuthMode::CookieOnly.sends_cookies());
        assert!(!AuthMode::CookieOnly.attaches_secret());
        assert!(AuthMode::Optional.attaches_secret());
    }
}
