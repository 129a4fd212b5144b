//! Application state: the immutable catalog and the per-session challenge
//! state stores.
//!
//! Each session owns an independent `SessionState`; nothing is shared between
//! sessions, so a learner resetting a challenge never disturbs anyone else.
//! Engine calls are synchronous and run to completion under the session map's
//! write lock — there is no overlapping validation within a session.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::load_trainer_config_from_env;
use crate::domain::ChallengeDefinition;
use crate::engine::{self, EngineError, Revealed, Verdict};
use crate::protocol::{to_out, ChallengeOut, ProgressOut};
use crate::regen::Regenerated;

/// Mutable per-challenge record, lifecycle = one session.
#[derive(Clone, Debug)]
pub struct ChallengeState {
    /// Starts equal to the definition's answer; replaced on regeneration.
    pub correct_selector: String,
    pub prompt: String,
    pub fragment_markup: String,
    pub attempts: u32,
    pub is_solved: bool,
    pub is_revealed: bool,
    /// Normalized selectors that have validated correctly this episode.
    pub distinct_correct: BTreeSet<String>,
}

impl ChallengeState {
    pub fn new(def: &ChallengeDefinition) -> Self {
        Self {
            correct_selector: def.answer_selector.clone(),
            prompt: def.prompt.clone(),
            fragment_markup: def.seed_markup.clone(),
            attempts: 0,
            is_solved: false,
            is_revealed: false,
            distinct_correct: BTreeSet::new(),
        }
    }

    /// Install a regenerated fragment/answer/prompt and clear every episode
    /// flag, including the reveal latch and the found-selector set.
    pub fn reset_with(&mut self, regen: Regenerated) {
        self.correct_selector = regen.correct_selector;
        self.prompt = regen.prompt;
        self.fragment_markup = regen.fragment_markup;
        self.attempts = 0;
        self.is_solved = false;
        self.is_revealed = false;
        self.distinct_correct.clear();
    }
}

/// One learner's view of the whole catalog. Challenge records are created
/// lazily on first touch.
#[derive(Default)]
pub struct SessionState {
    challenges: HashMap<u32, ChallengeState>,
}

impl SessionState {
    fn entry_for(&mut self, def: &ChallengeDefinition) -> &mut ChallengeState {
        self.challenges
            .entry(def.id)
            .or_insert_with(|| ChallengeState::new(def))
    }

    fn view_of(&mut self, def: &ChallengeDefinition) -> ChallengeOut {
        to_out(def, self.entry_for(def))
    }

    fn solved_count(&self) -> usize {
        self.challenges.values().filter(|st| st.is_solved).count()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl AppState {
    /// Build state from env: load the optional TOML bank and assemble the
    /// catalog. Sessions start empty.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let bank = load_trainer_config_from_env();
        let catalog = Catalog::build(bank.as_ref());
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, SessionState::default());
        info!(target: "cssdojo_backend", session = %id, "Session created");
        id
    }

    #[instrument(level = "info", skip(self), fields(session = %id))]
    pub async fn drop_session(&self, id: Uuid) {
        if self.sessions.write().await.remove(&id).is_some() {
            info!(target: "cssdojo_backend", session = %id, "Session dropped");
        }
    }

    fn definition(&self, challenge_id: u32) -> Result<&ChallengeDefinition, EngineError> {
        self.catalog
            .get(challenge_id)
            .ok_or(EngineError::UnknownChallenge(challenge_id))
    }

    /// Run one engine operation under the session's write lock.
    async fn with_challenge<R>(
        &self,
        session: Uuid,
        challenge_id: u32,
        op: impl FnOnce(&ChallengeDefinition, &mut ChallengeState) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let def = self.definition(challenge_id)?;
        let mut sessions = self.sessions.write().await;
        let state = sessions
            .get_mut(&session)
            .ok_or(EngineError::UnknownSession(session))?;
        op(def, state.entry_for(def))
    }

    /// Validate a submission for one challenge of one session.
    #[instrument(level = "info", skip(self, raw_input), fields(session = %session, id = challenge_id, input_len = raw_input.len()))]
    pub async fn submit(
        &self,
        session: Uuid,
        challenge_id: u32,
        raw_input: &str,
    ) -> Result<Verdict, EngineError> {
        self.with_challenge(session, challenge_id, |def, st| {
            engine::validate(def, st, raw_input)
        })
        .await
    }

    #[instrument(level = "info", skip(self), fields(session = %session, id = challenge_id))]
    pub async fn reveal(&self, session: Uuid, challenge_id: u32) -> Result<Revealed, EngineError> {
        self.with_challenge(session, challenge_id, |def, st| engine::reveal(def, st))
            .await
    }

    /// Regenerate a challenge and return its fresh view.
    #[instrument(level = "info", skip(self), fields(session = %session, id = challenge_id))]
    pub async fn reset_challenge(
        &self,
        session: Uuid,
        challenge_id: u32,
    ) -> Result<ChallengeOut, EngineError> {
        self.with_challenge(session, challenge_id, |def, st| {
            engine::reset(def, st);
            Ok(to_out(def, st))
        })
        .await
    }

    #[instrument(level = "debug", skip(self), fields(session = %session, id = challenge_id))]
    pub async fn challenge_view(
        &self,
        session: Uuid,
        challenge_id: u32,
    ) -> Result<ChallengeOut, EngineError> {
        self.with_challenge(session, challenge_id, |def, st| Ok(to_out(def, st)))
            .await
    }

    /// Catalog listing with this session's per-challenge state.
    #[instrument(level = "debug", skip(self), fields(session = %session))]
    pub async fn list_challenges(&self, session: Uuid) -> Result<Vec<ChallengeOut>, EngineError> {
        let mut sessions = self.sessions.write().await;
        let state = sessions
            .get_mut(&session)
            .ok_or(EngineError::UnknownSession(session))?;
        Ok(self.catalog.iter().map(|def| state.view_of(def)).collect())
    }

    /// Solved-vs-total summary. `completed` reports whether every catalog
    /// challenge is solved; persisting that flag across sessions is the
    /// caller's concern.
    #[instrument(level = "debug", skip(self), fields(session = %session))]
    pub async fn progress(&self, session: Uuid) -> Result<ProgressOut, EngineError> {
        let sessions = self.sessions.read().await;
        let state = sessions
            .get(&session)
            .ok_or(EngineError::UnknownSession(session))?;
        let solved = state.solved_count();
        let total = self.catalog.len();
        Ok(ProgressOut {
            solved,
            total,
            completed: solved == total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_independent() {
        let app = AppState::new();
        let a = app.create_session().await;
        let b = app.create_session().await;

        let v = app.submit(a, 1, "#login-primary").await.unwrap();
        assert!(matches!(v, Verdict::Correct { .. }));

        let pa = app.progress(a).await.unwrap();
        let pb = app.progress(b).await.unwrap();
        assert_eq!(pa.solved, 1);
        assert_eq!(pb.solved, 0);
        assert!(!pa.completed);
    }

    #[tokio::test]
    async fn unknown_ids_are_reported() {
        let app = AppState::new();
        let s = app.create_session().await;
        assert!(matches!(
            app.submit(s, 999, "#x").await,
            Err(EngineError::UnknownChallenge(999))
        ));
        app.drop_session(s).await;
        assert!(matches!(
            app.submit(s, 1, "#x").await,
            Err(EngineError::UnknownSession(_))
        ));
    }

    #[tokio::test]
    async fn completing_every_challenge_flips_the_flag() {
        let app = AppState::new();
        let s = app.create_session().await;
        for def in app.catalog.iter() {
            let v = app.submit(s, def.id, &def.answer_selector.clone()).await.unwrap();
            assert!(matches!(v, Verdict::Correct { .. }), "challenge {}", def.id);
        }
        let p = app.progress(s).await.unwrap();
        assert!(p.completed);
        assert_eq!(p.solved, p.total);
    }
}
