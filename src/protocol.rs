//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! The core never formats HTML: every reply is structured data plus plain
//! message strings; rendering and highlighting are the frontend's reaction to
//! the verdict, never a precondition for classification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, ChallengeDefinition};
use crate::engine::Verdict;
use crate::state::ChallengeState;

/// Messages the client can send over WebSocket. The socket itself is the
/// session; no session id travels in WS messages.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListChallenges,
    GetChallenge {
        #[serde(rename = "challengeId")]
        challenge_id: u32,
    },
    SubmitSelector {
        #[serde(rename = "challengeId")]
        challenge_id: u32,
        input: String,
    },
    Reveal {
        #[serde(rename = "challengeId")]
        challenge_id: u32,
    },
    ResetChallenge {
        #[serde(rename = "challengeId")]
        challenge_id: u32,
    },
    Progress,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    ChallengeList {
        challenges: Vec<ChallengeOut>,
    },
    Challenge {
        challenge: ChallengeOut,
    },
    SubmitResult {
        #[serde(rename = "challengeId")]
        challenge_id: u32,
        verdict: Verdict,
    },
    Revealed {
        #[serde(rename = "challengeId")]
        challenge_id: u32,
        selector: String,
        #[serde(rename = "alreadyRevealed")]
        already_revealed: bool,
    },
    ChallengeReset {
        challenge: ChallengeOut,
    },
    Progress(ProgressOut),
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for challenge delivery. Carries the current
/// (possibly regenerated) prompt and fragment, never the answer.
#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub id: u32,
    pub category: Category,
    #[serde(rename = "categoryName")]
    pub category_name: &'static str,
    pub prompt: String,
    #[serde(rename = "fragmentMarkup")]
    pub fragment_markup: String,
    pub attempts: u32,
    #[serde(rename = "isSolved")]
    pub is_solved: bool,
    #[serde(rename = "isRevealed")]
    pub is_revealed: bool,
    /// Distinct correct selectors found this episode.
    #[serde(rename = "distinctFound")]
    pub distinct_found: usize,
}

/// Project (definition, live state) onto the public DTO.
pub fn to_out(def: &ChallengeDefinition, st: &ChallengeState) -> ChallengeOut {
    ChallengeOut {
        id: def.id,
        category: def.category,
        category_name: def.category.info().display_name,
        prompt: st.prompt.clone(),
        fragment_markup: st.fragment_markup.clone(),
        attempts: st.attempts,
        is_solved: st.is_solved,
        is_revealed: st.is_revealed,
        distinct_found: st.distinct_correct.len(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "challengeId")]
    pub challenge_id: u32,
}

#[derive(Deserialize)]
pub struct SubmitIn {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "challengeId")]
    pub challenge_id: u32,
    pub input: String,
}

#[derive(Serialize)]
pub struct SubmitOut {
    #[serde(rename = "challengeId")]
    pub challenge_id: u32,
    pub verdict: Verdict,
}

#[derive(Deserialize)]
pub struct ChallengeActionIn {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "challengeId")]
    pub challenge_id: u32,
}

#[derive(Serialize)]
pub struct RevealOut {
    pub selector: String,
    #[serde(rename = "alreadyRevealed")]
    pub already_revealed: bool,
}

#[derive(Debug, Serialize)]
pub struct ProgressOut {
    pub solved: usize,
    pub total: usize,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
