//! `ArenaClient` builder and the operations the view layer calls.
//!
//! This is the entry point for using the arena client. It ties together
//! all the layers: transport → protocol → session → fight.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arena_fight::{FightHistory, FightOrchestrator, FightReport};
use arena_protocol::{ApiClient, Fight, FightId, FightPage, Hero, HeroId};
use arena_session::{SessionManager, SessionState};
use arena_transport::{CredentialStore, FileCredentialStore, HttpTransport, Transport};

use crate::{ArenaError, ClientConfig};

/// Builder for configuring an [`ArenaClient`].
///
/// # Example
///
/// ```rust,no_run
/// use arena::prelude::*;
///
/// # async fn run() -> Result<(), ArenaError> {
/// let client = ArenaClient::builder()
///     .base_url("http://localhost:5080")
///     .credentials_path("/tmp/arena.json")
///     .build()?;
/// client.bootstrap().await?;
/// # Ok(())
/// # }
/// ```
pub struct ArenaClientBuilder {
    config: ClientConfig,
}

impl ArenaClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.base_url = url.to_string();
        self
    }

    /// `None` waits indefinitely. Sub-second timeouts round up to one second.
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout_secs =
            timeout.map_or(0, |t| t.as_secs() + u64::from(t.subsec_nanos() > 0));
        self
    }

    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_path = path.into();
        self
    }

    pub fn username_prefix(mut self, prefix: &str) -> Self {
        self.config.username_prefix = prefix.to_string();
        self
    }

    pub fn page_limit(mut self, limit: u32) -> Self {
        self.config.page_limit = limit;
        self
    }

    /// Builds a client that talks HTTP and remembers its identity in the
    /// credentials file.
    ///
    /// # Errors
    /// - [`ArenaError::Transport`] — the base URL is not a valid http(s) URL
    /// - [`ArenaError::Store`] — the credentials file exists but can't be read
    pub fn build(self) -> Result<ArenaClient<HttpTransport, FileCredentialStore>, ArenaError> {
        let transport = HttpTransport::new(&self.config.base_url)?;
        let store = FileCredentialStore::open(&self.config.credentials_path)?;
        tracing::debug!(
            base_url = %self.config.base_url,
            credentials = %self.config.credentials_path.display(),
            "arena client configured"
        );
        Ok(ArenaClient::new(transport, Arc::new(store), &self.config))
    }

    /// Builds a client over the given transport and store.
    pub fn build_with<T: Transport, S: CredentialStore>(
        self,
        transport: T,
        store: Arc<S>,
    ) -> ArenaClient<T, S> {
        ArenaClient::new(transport, store, &self.config)
    }
}

impl Default for ArenaClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The client core, as seen by a view.
///
/// Owns one session and one fight orchestrator. Call
/// [`bootstrap`](Self::bootstrap) before anything else.
///
/// # Credential recovery
///
/// When hero creation or a fight fails because the server no longer
/// accepts the player's credential (401/403), the client provisions a new
/// identity once and then returns the original error. The caller may retry
/// the operation; the roster it sees is the new player's.
pub struct ArenaClient<T: Transport, S: CredentialStore> {
    session: Arc<SessionManager<T, S>>,
    fights: FightOrchestrator<T, S>,
}

impl ArenaClient<HttpTransport, FileCredentialStore> {
    /// Creates a new builder.
    pub fn builder() -> ArenaClientBuilder {
        ArenaClientBuilder::new()
    }
}

impl<T: Transport, S: CredentialStore> ArenaClient<T, S> {
    pub fn new(transport: T, store: Arc<S>, config: &ClientConfig) -> Self {
        let api = ApiClient::new(transport, store).with_timeout(config.request_timeout());
        let session = Arc::new(SessionManager::new(Arc::new(api), config.session_config()));
        let fights = FightOrchestrator::new(Arc::clone(&session), config.fight_config());
        Self { session, fights }
    }

    pub fn session(&self) -> &Arc<SessionManager<T, S>> {
        &self.session
    }

    pub fn orchestrator(&self) -> &FightOrchestrator<T, S> {
        &self.fights
    }

    // --- Session -----------------------------------------------------------

    /// See [`SessionManager::bootstrap`].
    pub async fn bootstrap(&self) -> Result<(), ArenaError> {
        Ok(self.session.bootstrap().await?)
    }

    pub async fn refresh_roster(&self) -> usize {
        self.session.refresh_hero_roster().await
    }

    /// Creates a hero. See [`SessionManager::create_hero`].
    pub async fn create_hero(&self, title: &str, description: &str) -> Result<Hero, ArenaError> {
        match self.session.create_hero(title, description).await {
            Ok(hero) => Ok(hero),
            Err(e) => Err(self.recover_if_rejected(e).await),
        }
    }

    pub async fn select_hero(&self, hero: Hero) {
        self.session.select_hero(hero).await;
    }

    pub async fn get_hero(&self, id: &HeroId) -> Result<Hero, ArenaError> {
        Ok(self.session.get_hero(id).await?)
    }

    pub async fn hero_image(&self, id: &HeroId) -> Option<Vec<u8>> {
        self.session.hero_image(id).await
    }

    /// A copy of the whole session state.
    pub async fn snapshot(&self) -> SessionState {
        self.session.snapshot().await
    }

    // --- Fights ------------------------------------------------------------

    /// Sends a hero into a fight. See [`FightOrchestrator::start_fight`].
    pub async fn start_fight(&self, hero_id: &HeroId) -> Result<FightReport, ArenaError> {
        match self.fights.start_fight(hero_id).await {
            Ok(report) => Ok(report),
            Err(e) => Err(self.recover_if_rejected(e).await),
        }
    }

    pub fn is_fighting(&self, hero_id: &HeroId) -> bool {
        self.fights.is_fighting(hero_id)
    }

    pub async fn fights(
        &self,
        hero_id: &HeroId,
        last_id: Option<FightId>,
        limit: Option<u32>,
    ) -> Result<FightPage, ArenaError> {
        Ok(self.fights.fights(hero_id, last_id, limit).await?)
    }

    pub fn history(&self, hero_id: &HeroId) -> FightHistory<'_, T, S> {
        self.fights.history(hero_id)
    }

    pub async fn fight(&self, hero_id: &HeroId, fight_id: &FightId) -> Result<Fight, ArenaError> {
        Ok(self.fights.fight(hero_id, fight_id).await?)
    }

    /// Provisions a new identity when `err` says the current credential was
    /// rejected, then hands `err` back unchanged.
    async fn recover_if_rejected(&self, err: impl Into<ArenaError>) -> ArenaError {
        let err = err.into();
        if err.is_credential_rejected() {
            tracing::warn!(error = %err, "credential rejected, provisioning a new identity");
            if let Err(recovery) = self.session.recover_identity().await {
                tracing::error!(error = %recovery, "identity recovery failed");
            }
        }
        err
    }
}
