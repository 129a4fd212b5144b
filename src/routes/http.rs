//! HTTP endpoint handlers. These are thin wrappers that forward to the state
//! store and engine; each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use super::ApiError;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip_all)]
pub async fn http_new_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session_id = state.create_session().await;
  Json(SessionOut { session_id })
}

#[instrument(level = "info", skip(state), fields(session = %q.session_id))]
pub async fn http_list_challenges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
  let challenges = state.list_challenges(q.session_id).await?;
  Ok(Json(challenges))
}

#[instrument(level = "info", skip(state), fields(session = %q.session_id, id = q.challenge_id))]
pub async fn http_get_challenge(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ChallengeQuery>,
) -> Result<impl IntoResponse, ApiError> {
  let challenge = state.challenge_view(q.session_id, q.challenge_id).await?;
  Ok(Json(challenge))
}

#[instrument(level = "info", skip(state, body), fields(session = %body.session_id, id = body.challenge_id, input_len = body.input.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmitIn>,
) -> Result<impl IntoResponse, ApiError> {
  let verdict = state
    .submit(body.session_id, body.challenge_id, &body.input)
    .await?;
  info!(target: "challenge", id = body.challenge_id, verdict = ?verdict, "HTTP submit evaluated");
  Ok(Json(SubmitOut {
    challenge_id: body.challenge_id,
    verdict,
  }))
}

#[instrument(level = "info", skip(state, body), fields(session = %body.session_id, id = body.challenge_id))]
pub async fn http_post_reveal(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChallengeActionIn>,
) -> Result<impl IntoResponse, ApiError> {
  let revealed = state.reveal(body.session_id, body.challenge_id).await?;
  info!(target: "challenge", id = body.challenge_id, already = revealed.already_revealed, "HTTP reveal served");
  Ok(Json(RevealOut {
    selector: revealed.selector,
    already_revealed: revealed.already_revealed,
  }))
}

#[instrument(level = "info", skip(state, body), fields(session = %body.session_id, id = body.challenge_id))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChallengeActionIn>,
) -> Result<impl IntoResponse, ApiError> {
  let challenge = state
    .reset_challenge(body.session_id, body.challenge_id)
    .await?;
  info!(target: "challenge", id = body.challenge_id, "HTTP reset regenerated challenge");
  Ok(Json(challenge))
}

#[instrument(level = "info", skip(state), fields(session = %q.session_id))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
  let progress = state.progress(q.session_id).await?;
  Ok(Json(progress))
}
