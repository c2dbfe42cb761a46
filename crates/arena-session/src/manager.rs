//! The session manager: owns the client's player and hero roster.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Bootstrapping an identity (recover the stored one, or provision)
//! - Keeping the hero roster in sync with the server
//! - Creating heroes and tracking the selected one
//! - Applying fight rating changes to the roster
//!
//! # Concurrency note
//!
//! State lives behind a `tokio::sync::RwLock`, but the lock is never held
//! across a network call: each operation reads what it needs, releases the
//! lock, awaits the server, then re-acquires the lock to write. Anything
//! that may have changed in between (the current identity, mostly) is
//! re-checked before writing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arena_protocol::{
    ApiClient, ApiError, CreateHeroRequest, CreatePlayerRequest, Endpoint, Hero,
    HeroId, Player, PlayerId, ProtocolError, SecretToken,
};
use arena_transport::{
    CredentialStore, PLAYER_ID_KEY, PLAYER_SECRET_KEY, Transport,
};
use tokio::sync::RwLock;

use crate::{LifecycleStatus, SessionConfig, SessionError, SessionState};

// ---------------------------------------------------------------------------
// BootstrapGuard
// ---------------------------------------------------------------------------

/// Holds the bootstrap slot for as long as it lives.
///
/// Dropping the guard frees the slot. If bootstrap never reached a final
/// status (the caller dropped the future), a session still marked
/// `Bootstrapping` is moved to `Errored` so a later bootstrap can run.
struct BootstrapGuard<'a> {
    running: &'a AtomicBool,
    state: &'a RwLock<SessionState>,
    settled: bool,
}

impl<'a> BootstrapGuard<'a> {
    /// Takes the slot, or returns `None` if another bootstrap holds it.
    fn acquire(running: &'a AtomicBool, state: &'a RwLock<SessionState>) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                running,
                state,
                settled: false,
            })
    }

    /// Marks the status as final; dropping the guard no longer touches it.
    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for BootstrapGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            // Misses only while a reader holds the lock; the slot is freed either way.
            if let Ok(mut state) = self.state.try_write() {
                if state.status == LifecycleStatus::Bootstrapping {
                    tracing::warn!("bootstrap cancelled before completion");
                    state.status = LifecycleStatus::Errored {
                        reason: "bootstrap cancelled".to_string(),
                    };
                }
            }
        }
        self.running.store(false, Ordering::Release);
    }
}

/// Owns the single session of one client instance.
///
/// ## Lifecycle
///
/// ```text
/// bootstrap() ──→ [stored id?] ──yes──→ GET /player/{id} ──ok──→ adopt
///                      │                      │
///                      no                   failed
///                      ▼                      ▼
///                 provision ◀─────────────────┘  (exactly once)
///                      │
///                      ▼
///            refresh_hero_roster() ──→ [Ready]
/// ```
///
/// Construct a fresh manager per client (and per test); there is no
/// global instance.
pub struct SessionManager<T: Transport, S: CredentialStore> {
    api: Arc<ApiClient<T, S>>,
    config: SessionConfig,
    state: RwLock<SessionState>,
    bootstrapping: AtomicBool,
}

impl<T: Transport, S: CredentialStore> SessionManager<T, S> {
    /// Creates an `Uninitialized` session.
    pub fn new(api: Arc<ApiClient<T, S>>, config: SessionConfig) -> Self {
        Self {
            api,
            config,
            state: RwLock::new(SessionState::default()),
            bootstrapping: AtomicBool::new(false),
        }
    }

    /// The API client this session talks through.
    pub fn api(&self) -> &Arc<ApiClient<T, S>> {
        &self.api
    }

    // =====================================================================
    // Bootstrap
    // =====================================================================

    /// Establishes the player identity and loads the hero roster.
    ///
    /// Safe to call more than once: a `Ready` session returns `Ok`
    /// without making requests. An `Errored` session is bootstrapped
    /// again from scratch.
    ///
    /// A stored identity that can't be fetched (not found, rejected,
    /// network down) is not an error: the session provisions a new player
    /// instead. Only when that provisioning also fails does the session
    /// end `Errored`.
    ///
    /// Dropping the returned future before it finishes leaves the session
    /// `Errored` with reason `bootstrap cancelled`, and bootstrap may be
    /// called again.
    ///
    /// # Errors
    /// - [`SessionError::BootstrapInProgress`] — another bootstrap is running
    /// - [`SessionError::BootstrapFailed`] — no identity could be obtained
    pub async fn bootstrap(&self) -> Result<(), SessionError> {
        let mut guard = {
            let mut state = self.state.write().await;
            if state.status == LifecycleStatus::Ready {
                tracing::debug!("session already ready, bootstrap skipped");
                return Ok(());
            }
            let Some(guard) = BootstrapGuard::acquire(&self.bootstrapping, &self.state) else {
                return Err(SessionError::BootstrapInProgress);
            };
            state.status = LifecycleStatus::Bootstrapping;
            guard
        };

        tracing::info!("bootstrapping session");

        let identity = match self.api.store().get(PLAYER_ID_KEY) {
            None => {
                tracing::info!("no stored identity, provisioning a new player");
                self.provision().await
            }
            Some(stored) => {
                let stored = PlayerId::new(stored);
                match self.fetch_player(&stored).await {
                    Ok(player) => {
                        self.adopt(player.clone()).await;
                        tracing::info!(player_id = %player.id, "stored identity recovered");
                        Ok(player)
                    }
                    Err(e) => {
                        tracing::warn!(
                            player_id = %stored,
                            error = %e,
                            "stored identity unusable, provisioning a new player"
                        );
                        self.provision().await
                    }
                }
            }
        };

        let player = match identity {
            Ok(player) => player,
            Err(e) => {
                tracing::error!(error = %e, "bootstrap failed");
                self.state.write().await.status = LifecycleStatus::Errored {
                    reason: e.to_string(),
                };
                guard.settle();
                return Err(SessionError::BootstrapFailed(e));
            }
        };

        let heroes = self.refresh_hero_roster().await;

        self.state.write().await.status = LifecycleStatus::Ready;
        guard.settle();
        tracing::info!(player_id = %player.id, heroes, "session ready");
        Ok(())
    }

    /// Creates a brand-new player and makes it the current identity.
    ///
    /// The roster and selection are cleared (they belonged to the old
    /// identity) and the store is updated so the new identity survives a
    /// restart. This does not refresh the roster; see
    /// [`recover_identity`](Self::recover_identity).
    pub async fn provision_new_player(&self) -> Result<Player, SessionError> {
        Ok(self.provision().await?)
    }

    /// Replaces the current identity with a freshly provisioned one and
    /// reloads the roster.
    ///
    /// Used when the server reports the credential as no longer valid.
    pub async fn recover_identity(&self) -> Result<Player, SessionError> {
        let player = self.provision().await?;
        self.refresh_hero_roster().await;
        Ok(player)
    }

    async fn fetch_player(&self, id: &PlayerId) -> Result<Player, ApiError> {
        // No body secret here: there is no current player yet, so the
        // stored cookies are the only credential that goes out.
        let mut player: Player = self
            .api
            .request(&Endpoint::GetPlayer(id.clone()), None, None)
            .await?;

        if player.secret_token.is_empty() {
            if let Some(secret) = self.api.store().get(PLAYER_SECRET_KEY) {
                player.secret_token = SecretToken::new(secret);
            }
        }
        Ok(player)
    }

    async fn provision(&self) -> Result<Player, ApiError> {
        let request = CreatePlayerRequest {
            username: self.config.generate_username(),
        };
        let body = serde_json::to_value(&request).map_err(ProtocolError::Encode)?;

        let player: Player = self
            .api
            .request(&Endpoint::CreatePlayer, Some(body), None)
            .await?;

        if player.secret_token.is_empty() {
            tracing::warn!(player_id = %player.id, "provisioned player came without a secret");
        }

        self.adopt(player.clone()).await;
        tracing::info!(player_id = %player.id, handle = %player.handle(), "player provisioned");
        Ok(player)
    }

    /// Makes `player` the current identity and remembers it in the store.
    async fn adopt(&self, player: Player) {
        self.remember(&player);

        let mut state = self.state.write().await;
        let same_identity = state.player.as_ref().is_some_and(|p| p.id == player.id);
        if !same_identity {
            state.roster.clear();
            state.selected_hero = None;
        }
        state.player = Some(player);
    }

    /// Writes the identity keys. A failed write is logged, not raised:
    /// the identity still works for this process.
    fn remember(&self, player: &Player) {
        let store = self.api.store();
        if let Err(e) = store.set(PLAYER_ID_KEY, player.id.as_str()) {
            tracing::warn!(error = %e, "failed to persist player id");
        }
        if !player.secret_token.is_empty() {
            if let Err(e) = store.set(PLAYER_SECRET_KEY, player.secret_token.expose()) {
                tracing::warn!(error = %e, "failed to persist player secret");
            }
        }
    }

    // =====================================================================
    // Roster
    // =====================================================================

    /// Reloads the hero roster of the current player.
    ///
    /// Returns the number of heroes now in the roster.
    ///
    /// - No current player → no request, returns 0.
    /// - Request fails → the roster is emptied rather than left stale.
    /// - The identity changed while the request was in flight → the
    ///   response is discarded.
    /// - Heroes owned by someone else are dropped.
    pub async fn refresh_hero_roster(&self) -> usize {
        let Some(player) = self.state.read().await.player.clone() else {
            tracing::debug!("no current player, roster refresh skipped");
            return 0;
        };

        let result: Result<Vec<Hero>, ApiError> = self
            .api
            .request(
                &Endpoint::PlayerHeroes(player.id.clone()),
                None,
                Some(&player.secret_token),
            )
            .await;

        let mut state = self.state.write().await;
        if state.player.as_ref().map(|p| &p.id) != Some(&player.id) {
            tracing::debug!(player_id = %player.id, "identity changed during refresh, result discarded");
            return state.roster.len();
        }

        match result {
            Ok(heroes) => {
                let (own, foreign): (Vec<Hero>, Vec<Hero>) = heroes
                    .into_iter()
                    .partition(|h| h.owner_player_id == player.id);
                if !foreign.is_empty() {
                    tracing::warn!(
                        player_id = %player.id,
                        dropped = foreign.len(),
                        "roster response contained heroes of another player"
                    );
                }
                state.roster = own;
            }
            Err(e) => {
                tracing::warn!(player_id = %player.id, error = %e, "roster refresh failed, showing no heroes");
                state.roster = Vec::new();
            }
        }

        let fresh_selection = state
            .selected_hero
            .as_ref()
            .and_then(|selected| state.roster.iter().find(|h| h.id == selected.id))
            .cloned();
        if fresh_selection.is_some() {
            state.selected_hero = fresh_selection;
        }

        tracing::debug!(player_id = %player.id, heroes = state.roster.len(), "roster refreshed");
        state.roster.len()
    }

    // =====================================================================
    // Heroes
    // =====================================================================

    /// Creates a hero for the current player and reloads the roster.
    ///
    /// `title` and `description` are trimmed; either being empty is
    /// rejected before any request is made. If the response embeds the
    /// owning player, that record becomes the current player.
    ///
    /// # Errors
    /// - [`SessionError::InvalidHero`] — empty title or description
    /// - [`SessionError::NotReady`] — bootstrap hasn't completed
    /// - [`SessionError::Api`] — the server refused or was unreachable
    pub async fn create_hero(&self, title: &str, description: &str) -> Result<Hero, SessionError> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() {
            return Err(SessionError::InvalidHero("title"));
        }
        if description.is_empty() {
            return Err(SessionError::InvalidHero("description"));
        }

        let player = self.ensure_ready().await?;

        let request = CreateHeroRequest {
            title: title.to_string(),
            description: description.to_string(),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| ApiError::from(ProtocolError::Encode(e)))?;

        let hero: Hero = self
            .api
            .request(&Endpoint::CreateHero, Some(body), Some(&player.secret_token))
            .await?;

        if let Some(embedded) = hero.player.clone() {
            self.adopt_embedded(embedded).await;
        }

        tracing::info!(hero_id = %hero.id, title = %hero.title, "hero created");
        self.refresh_hero_roster().await;
        Ok(hero)
    }

    /// Adopts the player embedded in a hero response. The embedded copy
    /// usually lacks the secret; the one we hold is carried over.
    async fn adopt_embedded(&self, mut embedded: Player) {
        let replaced = {
            let mut state = self.state.write().await;
            let current = state.player.as_ref();
            let same_identity = current.is_some_and(|p| p.id == embedded.id);

            if embedded.secret_token.is_empty() {
                if let Some(current) = current.filter(|_| same_identity) {
                    embedded.secret_token = current.secret_token.clone();
                }
            }
            if !same_identity {
                state.roster.clear();
                state.selected_hero = None;
            }
            state.player = Some(embedded.clone());
            !same_identity
        };

        if replaced {
            tracing::info!(player_id = %embedded.id, "server reported a different player, identity replaced");
            self.remember(&embedded);
        }
    }

    /// Fetches one hero by id.
    pub async fn get_hero(&self, id: &HeroId) -> Result<Hero, SessionError> {
        let secret = self.current_secret().await;
        let hero = self
            .api
            .request(&Endpoint::GetHero(id.clone()), None, secret.as_ref())
            .await?;
        Ok(hero)
    }

    /// Fetches a hero's portrait. Images are optional: any failure is
    /// logged and reported as `None`.
    pub async fn hero_image(&self, id: &HeroId) -> Option<Vec<u8>> {
        match self.api.send(&Endpoint::HeroImage(id.clone()), None, None).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(hero_id = %id, error = %e, "hero image unavailable");
                None
            }
        }
    }

    /// Focuses the view on `hero`. No request; always succeeds.
    pub async fn select_hero(&self, hero: Hero) {
        self.state.write().await.selected_hero = Some(hero);
    }

    /// Applies a signed rating change to the roster entry `id`, in place.
    ///
    /// Returns the new rating, or `None` if the hero is no longer in the
    /// roster (nothing is changed then). Ratings saturate at 0. Only the
    /// roster entry changes; the selection keeps the copy it was given.
    pub async fn apply_rating_delta(&self, id: &HeroId, delta: i32) -> Option<u32> {
        let mut state = self.state.write().await;
        let hero = state.roster.iter_mut().find(|h| &h.id == id)?;
        hero.rating = hero.rating.saturating_add_signed(delta);
        Some(hero.rating)
    }

    // =====================================================================
    // Read access
    // =====================================================================

    /// The current player, or [`SessionError::NotReady`].
    pub async fn ensure_ready(&self) -> Result<Player, SessionError> {
        let state = self.state.read().await;
        match (&state.status, &state.player) {
            (LifecycleStatus::Ready, Some(player)) => Ok(player.clone()),
            (status, _) => Err(SessionError::NotReady(status.clone())),
        }
    }

    /// The current player's secret, if there is a current player.
    pub async fn current_secret(&self) -> Option<SecretToken> {
        self.state
            .read()
            .await
            .player
            .as_ref()
            .map(|p| p.secret_token.clone())
    }

    pub async fn status(&self) -> LifecycleStatus {
        self.state.read().await.status.clone()
    }

    pub async fn player(&self) -> Option<Player> {
        self.state.read().await.player.clone()
    }

    pub async fn roster(&self) -> Vec<Hero> {
        self.state.read().await.roster.clone()
    }

    pub async fn selected_hero(&self) -> Option<Hero> {
        self.state.read().await.selected_hero.clone()
    }

    /// A roster entry by id.
    pub async fn hero(&self, id: &HeroId) -> Option<Hero> {
        self.state.read().await.hero(id).cloned()
    }

    /// A copy of the whole session state.
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }
}
