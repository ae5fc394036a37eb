//! Chat request handler.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::identity::CallerId;
use crate::models::{ChatRequest, ChatResponse};

/// `POST /chat` — record the prompt in the caller's conversation and return
/// the model's reply.
pub async fn chat_handler(
    State(state): State<AppState>,
    caller: CallerId,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let response = state.chat.handle_turn(caller.as_str(), &body.prompt).await?;
    Ok(Json(ChatResponse { response }))
}
