//! The fight orchestrator: one fight request per hero at a time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arena_protocol::{Endpoint, Fight, FightId, FightPage, FightResult, HeroId};
use arena_session::{SessionError, SessionManager};
use arena_transport::{CredentialStore, Transport};

use crate::{FightConfig, FightError, FightHistory};

// ---------------------------------------------------------------------------
// FightReport
// ---------------------------------------------------------------------------

/// The result of a finished fight, as applied to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FightReport {
    pub fight: Fight,
    pub victory: bool,
    /// Signed rating change of the attacking hero.
    pub rating_delta: i32,
    /// The hero's rating after the change, or `None` if the hero left the
    /// roster while the fight was in flight (nothing was updated then).
    pub rating_after: Option<u32>,
}

// ---------------------------------------------------------------------------
// FightGuard
// ---------------------------------------------------------------------------

/// Marks a hero as fighting for as long as it lives.
///
/// Dropping the guard clears the mark, so every exit path of a fight
/// (success, error, or the caller dropping the future) releases the hero.
struct FightGuard<'a> {
    hero_id: HeroId,
    in_flight: &'a Mutex<HashSet<HeroId>>,
}

impl<'a> FightGuard<'a> {
    /// Marks `hero_id`, or returns `None` if it is already marked.
    fn acquire(in_flight: &'a Mutex<HashSet<HeroId>>, hero_id: &HeroId) -> Option<Self> {
        let inserted = lock(in_flight).insert(hero_id.clone());
        inserted.then(|| Self {
            hero_id: hero_id.clone(),
            in_flight,
        })
    }
}

impl Drop for FightGuard<'_> {
    fn drop(&mut self) {
        lock(self.in_flight).remove(&self.hero_id);
    }
}

fn lock(in_flight: &Mutex<HashSet<HeroId>>) -> MutexGuard<'_, HashSet<HeroId>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// FightOrchestrator
// ---------------------------------------------------------------------------

/// Starts fights for the session's heroes and reads their history.
///
/// Fights of the same hero are strictly serialized: a second
/// [`start_fight`](Self::start_fight) while one is pending is refused with
/// [`FightError::AlreadyFighting`]. Fights of different heroes may run
/// concurrently.
pub struct FightOrchestrator<T: Transport, S: CredentialStore> {
    session: Arc<SessionManager<T, S>>,
    config: FightConfig,
    in_flight: Mutex<HashSet<HeroId>>,
}

impl<T: Transport, S: CredentialStore> FightOrchestrator<T, S> {
    pub fn new(session: Arc<SessionManager<T, S>>, config: FightConfig) -> Self {
        Self {
            session,
            config,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager<T, S>> {
        &self.session
    }

    pub fn config(&self) -> &FightConfig {
        &self.config
    }

    /// Sends `hero_id` into a fight and applies the rating change.
    ///
    /// # Steps
    /// 1. The session must be `Ready` and the hero in its roster.
    /// 2. The hero is marked as fighting; if it already was, the call
    ///    fails without a request.
    /// 3. `POST /hero/{id}/fight` with the player's credential.
    /// 4. On success, `elo_gain` is added to that roster entry (saturating
    ///    at 0). Other heroes and the selection are left alone.
    ///
    /// On failure nothing is changed locally and the error is returned.
    pub async fn start_fight(&self, hero_id: &HeroId) -> Result<FightReport, FightError> {
        let player = match self.session.ensure_ready().await {
            Ok(player) => player,
            Err(SessionError::NotReady(status)) => return Err(FightError::SessionNotReady(status)),
            Err(e) => return Err(e.into()),
        };

        if self.session.hero(hero_id).await.is_none() {
            return Err(FightError::UnknownHero(hero_id.clone()));
        }

        let Some(_guard) = FightGuard::acquire(&self.in_flight, hero_id) else {
            tracing::debug!(%hero_id, "fight refused, hero already fighting");
            return Err(FightError::AlreadyFighting(hero_id.clone()));
        };

        tracing::info!(%hero_id, "starting fight");

        let result: FightResult = self
            .session
            .api()
            .request(
                &Endpoint::StartFight(hero_id.clone()),
                None,
                Some(&player.secret_token),
            )
            .await
            .inspect_err(|e| tracing::warn!(%hero_id, error = %e, "fight failed"))?;

        let rating_after = self
            .session
            .apply_rating_delta(hero_id, result.elo_gain)
            .await;
        if rating_after.is_none() {
            tracing::warn!(%hero_id, "hero left the roster during the fight, rating not applied");
        }

        tracing::info!(
            %hero_id,
            fight_id = %result.fight.id,
            outcome = %result.fight.outcome,
            elo_gain = result.elo_gain,
            "fight finished"
        );

        Ok(FightReport {
            fight: result.fight,
            victory: result.victory,
            rating_delta: result.elo_gain,
            rating_after,
        })
    }

    /// Whether `hero_id` has a fight in flight.
    pub fn is_fighting(&self, hero_id: &HeroId) -> bool {
        lock(&self.in_flight).contains(hero_id)
    }

    /// Reads one page of a hero's fights, newest first.
    ///
    /// `last_id` is the `next_cursor` of the previous page (`None` for the
    /// first page); `limit` falls back to [`FightConfig::page_limit`].
    pub async fn fights(
        &self,
        hero_id: &HeroId,
        last_id: Option<FightId>,
        limit: Option<u32>,
    ) -> Result<FightPage, FightError> {
        let endpoint = Endpoint::HeroFights {
            hero_id: hero_id.clone(),
            last_id,
            limit: limit.unwrap_or(self.config.page_limit),
        };
        Ok(self.session.api().request(&endpoint, None, None).await?)
    }

    /// A pager over all of a hero's fights, starting at the newest.
    pub fn history(&self, hero_id: &HeroId) -> FightHistory<'_, T, S> {
        FightHistory::new(self, hero_id.clone(), self.config.page_limit)
    }

    /// Reads one fight of a hero.
    pub async fn fight(&self, hero_id: &HeroId, fight_id: &FightId) -> Result<Fight, FightError> {
        let endpoint = Endpoint::GetFight {
            hero_id: hero_id.clone(),
            fight_id: fight_id.clone(),
        };
        Ok(self.session.api().request(&endpoint, None, None).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fight_guard_rejects_second_acquire() {
        let in_flight = Mutex::new(HashSet::new());
        let hero = HeroId::new("h1");

        let first = FightGuard::acquire(&in_flight, &hero);
        assert!(first.is_some());
        assert!(FightGuard::acquire(&in_flight, &hero).is_none());
    }

    #[test]
    fn test_fight_guard_releases_on_drop() {
        let in_flight = Mutex::new(HashSet::new());
        let hero = HeroId::new("h1");

        drop(FightGuard::acquire(&in_flight, &hero));

        assert!(lock(&in_flight).is_empty());
        assert!(FightGuard::acquire(&in_flight, &hero).is_some());
    }

    #[test]
    fn test_fight_guard_heroes_are_independent() {
        let in_flight = Mutex::new(HashSet::new());

        let _h1 = FightGuard::acquire(&in_flight, &HeroId::new("h1"));
        let h2 = FightGuard::acquire(&in_flight, &HeroId::new("h2"));

        assert!(h2.is_some());
        assert_eq!(lock(&in_flight).len(), 2);
    }
}
