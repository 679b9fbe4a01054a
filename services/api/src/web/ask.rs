//! services/api/src/web/ask.rs
//!
//! The chat endpoint: classifies the seeker's question, builds the persona
//! prompt, calls the generation service, normalizes the reply, appends the
//! exchange to the user's history, and answers in character on every path.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::extract::{extract_answer, Answer, FALLBACK_REFERENCE};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;
use divineverse_core::domain::{ChatRole, ChatTurn};
use divineverse_core::intent::{classify, Intent};
use divineverse_core::ports::PortError;

//=========================================================================================
// Persona Prompt
//=========================================================================================

const DIVINE_PREAMBLE: &str = r#"You are Lord Krishna. Speak calmly, kindly, and with spiritual clarity.
Address the seeker as "dear one" or "Arjuna". Include relevant Gita references.
Always respond in valid JSON only — no markdown, no code blocks:
{
  "response": "<Krishna's divine answer>",
  "reference": "<chapter.verse or '—'>"
}
"#;

const CONCEPT_CLAUSE: &str =
    "Explain the concept with Bhagavad Gita context and modern meaning.";
const EMOTIONAL_CLAUSE: &str = "Offer compassionate spiritual guidance and reassurance.";
const GREETING_CLAUSE: &str = "Give a gentle greeting response as Krishna would.";
const GENERAL_CLAUSE: &str = "Answer with wisdom and a final reflection from the Gita.";

//=========================================================================================
// Fallback Texts
//=========================================================================================

const EMPTY_QUESTION_MSG: &str = "Please share your question, dear seeker.";
const RATE_LIMITED_MSG: &str =
    "Krishna rests for a while, dear one. Too many prayers at once — please try again shortly.";
const UPSTREAM_SILENCE_MSG: &str =
    "The eternal silence prevails, Arjuna. Try again when your heart is still.";
const FALTERED_MSG: &str =
    "Even divine words may falter through human noise, dear one. Reflect calmly and seek again.";
const FALLEN_SILENT_MSG: &str =
    "Even the divine may fall silent, dear one. The message could not be formed.";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
}

/// The body shape for every reply of this endpoint, success or failure:
/// the client never receives a body without a `response` field.
#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    pub success: bool,
    pub response: String,
    pub reference: String,
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /api/krishna/ask - Ask a question, protected by a bearer token.
#[utoipa::path(
    post,
    path = "/api/krishna/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "The answer, with its Gita reference", body = AskResponse),
        (status = 400, description = "Empty question"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 429, description = "Upstream rate limited; in-character fallback body", body = AskResponse),
        (status = 500, description = "Upstream or server failure; in-character fallback body", body = AskResponse)
    )
)]
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    AuthUser { user_id }: AuthUser,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Reject empty questions before spending an upstream call.
    let question = req.question.trim();
    if question.is_empty() {
        return Err(ApiError::Validation(EMPTY_QUESTION_MSG.to_string()));
    }

    // 2. Pick the prompt template from the question's intent bucket.
    let intent = classify(&req.question);
    let prompt = format!(
        "{}\n\nSeeker asks: \"{}\"",
        build_instruction(&intent),
        req.question
    );

    // 3. One outbound call, bounded by the client-wide timeout. Both failure
    //    paths still answer in character with a `response` body.
    let raw = match state.oracle.generate(&prompt).await {
        Ok(raw) => raw,
        Err(PortError::RateLimited) => {
            warn!("generation API rate limited");
            return Ok(ask_reply(
                StatusCode::TOO_MANY_REQUESTS,
                false,
                RATE_LIMITED_MSG,
                FALLBACK_REFERENCE,
            ));
        }
        Err(e) => {
            error!("generation request failed: {e}");
            return Ok(ask_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                UPSTREAM_SILENCE_MSG,
                FALLBACK_REFERENCE,
            ));
        }
    };

    // 4. Normalize the reply; an unusable reply becomes the fixed apology,
    //    and the history records that the message could not be formed.
    let (answer, history_text) = match extract_answer(&raw) {
        Some(answer) => {
            let history_text = answer.response.clone();
            (answer, history_text)
        }
        None => (
            Answer {
                response: FALTERED_MSG.to_string(),
                reference: FALLBACK_REFERENCE.to_string(),
            },
            FALLEN_SILENT_MSG.to_string(),
        ),
    };

    // 5. Append the exchange to the user's history, best-effort: a missing
    //    record or failed insert never fails the request.
    let turns = [
        ChatTurn {
            role: ChatRole::User,
            content: question.to_string(),
        },
        ChatTurn {
            role: ChatRole::Assistant,
            content: history_text,
        },
    ];
    if let Err(e) = state.db.append_chat_turns(user_id, &turns).await {
        warn!("failed to persist chat history for user {user_id}: {e}");
    }

    Ok(ask_reply(
        StatusCode::OK,
        true,
        &answer.response,
        &answer.reference,
    ))
}

/// Combines the fixed persona preamble with the bucket-specific clause.
fn build_instruction(intent: &Intent) -> String {
    let clause = match intent {
        Intent::VerseReference { chapter, verse } => format!(
            "The seeker refers to Chapter {}, Verse {}. Include Sanskrit, transliteration, translation, and reflection.",
            chapter, verse
        ),
        Intent::Concept => CONCEPT_CLAUSE.to_string(),
        Intent::Emotional => EMOTIONAL_CLAUSE.to_string(),
        Intent::Greeting => GREETING_CLAUSE.to_string(),
        Intent::General => GENERAL_CLAUSE.to_string(),
    };
    format!("{}{}", DIVINE_PREAMBLE, clause)
}

fn ask_reply(
    status: StatusCode,
    success: bool,
    response: &str,
    reference: &str,
) -> (StatusCode, Json<AskResponse>) {
    (
        status,
        Json(AskResponse {
            success,
            response: response.to_string(),
            reference: reference.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_instruction_interpolates_the_reference() {
        let instruction = build_instruction(&Intent::VerseReference {
            chapter: 2,
            verse: 47,
        });
        assert!(instruction.starts_with(DIVINE_PREAMBLE));
        assert!(instruction.contains("Chapter 2, Verse 47"));
    }

    #[test]
    fn every_bucket_keeps_the_persona_preamble() {
        for intent in [
            Intent::Concept,
            Intent::Emotional,
            Intent::Greeting,
            Intent::General,
        ] {
            assert!(build_instruction(&intent).starts_with(DIVINE_PREAMBLE));
        }
    }
}
