//! Cursor-following pager over a hero's fight history.

use arena_protocol::{Fight, FightId, HeroId};
use arena_transport::{CredentialStore, Transport};

use crate::{FightError, FightOrchestrator};

/// Walks a hero's fights page by page, newest first.
///
/// Each call to [`next_page`](Self::next_page) fetches one page and moves
/// the cursor to that page's `next_cursor`. The pager is exhausted once the
/// server reports no more pages, or hands back no cursor, or repeats the
/// cursor it was given.
///
/// ```text
/// next_page() ──→ GET /hero/{id}/fights?limit=N           ──→ [f40..f21]
/// next_page() ──→ GET /hero/{id}/fights?last_id=f21&limit=N ──→ [f20..f1]
/// next_page() ──→ Ok(None)
/// ```
///
/// A failed page leaves the cursor where it was, so calling again retries
/// the same page.
pub struct FightHistory<'a, T: Transport, S: CredentialStore> {
    orchestrator: &'a FightOrchestrator<T, S>,
    hero_id: HeroId,
    cursor: Option<FightId>,
    limit: u32,
    exhausted: bool,
}

impl<'a, T: Transport, S: CredentialStore> FightHistory<'a, T, S> {
    pub(crate) fn new(orchestrator: &'a FightOrchestrator<T, S>, hero_id: HeroId, limit: u32) -> Self {
        Self {
            orchestrator,
            hero_id,
            cursor: None,
            limit,
            exhausted: false,
        }
    }

    /// Overrides the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn hero_id(&self) -> &HeroId {
        &self.hero_id
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetches the next page. `Ok(None)` once the history is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Fight>>, FightError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .orchestrator
            .fights(&self.hero_id, self.cursor.clone(), Some(self.limit))
            .await?;

        let stalled = page.next_cursor.is_some() && page.next_cursor == self.cursor;
        if stalled {
            tracing::warn!(hero_id = %self.hero_id, "fight history cursor did not advance, stopping");
        }

        self.exhausted = !page.has_more || page.next_cursor.is_none() || stalled;
        self.cursor = page.next_cursor;

        tracing::debug!(
            hero_id = %self.hero_id,
            fights = page.fights.len(),
            exhausted = self.exhausted,
            "fight history page read"
        );
        Ok(Some(page.fights))
    }

    /// Reads pages until the history is exhausted or at least `max` fights
    /// were collected. The result may hold up to one page more than `max`.
    pub async fn collect(mut self, max: usize) -> Result<Vec<Fight>, FightError> {
        let mut fights = Vec::new();
        while fights.len() < max {
            match self.next_page().await? {
                Some(page) => fights.extend(page),
                None => break,
            }
        }
        Ok(fights)
    }
}
