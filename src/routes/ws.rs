//! WebSocket upgrade + message loop. The socket owns an implicit session:
//! created on connect, dropped on disconnect. Each client message is parsed
//! as JSON and forwarded to the engine; we reply with a single JSON message
//! per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "cssdojo_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session = state.create_session().await;
  info!(target: "cssdojo_backend", %session, "WebSocket connected");

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "cssdojo_backend", %session, "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, session).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "cssdojo_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }

  state.drop_session(session).await;
  info!(target: "cssdojo_backend", %session, "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: Uuid) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListChallenges => match state.list_challenges(session).await {
      Ok(challenges) => ServerWsMessage::ChallengeList { challenges },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::GetChallenge { challenge_id } => {
      match state.challenge_view(session, challenge_id).await {
        Ok(challenge) => ServerWsMessage::Challenge { challenge },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SubmitSelector { challenge_id, input } => {
      match state.submit(session, challenge_id, &input).await {
        Ok(verdict) => {
          tracing::info!(target: "challenge", id = challenge_id, verdict = ?verdict, "WS submit evaluated");
          ServerWsMessage::SubmitResult { challenge_id, verdict }
        }
        Err(e) => {
          tracing::error!(target: "challenge", id = challenge_id, error = %e, "WS submit failed");
          ServerWsMessage::Error { message: e.to_string() }
        }
      }
    }

    ClientWsMessage::Reveal { challenge_id } => {
      match state.reveal(session, challenge_id).await {
        Ok(revealed) => {
          tracing::info!(target: "challenge", id = challenge_id, already = revealed.already_revealed, "WS reveal served");
          ServerWsMessage::Revealed {
            challenge_id,
            selector: revealed.selector,
            already_revealed: revealed.already_revealed,
          }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::ResetChallenge { challenge_id } => {
      match state.reset_challenge(session, challenge_id).await {
        Ok(challenge) => {
          tracing::info!(target: "challenge", id = challenge_id, "WS reset regenerated challenge");
          ServerWsMessage::ChallengeReset { challenge }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::Progress => match state.progress(session).await {
      Ok(progress) => ServerWsMessage::Progress(progress),
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
  }
}
