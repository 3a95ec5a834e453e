//! Chat assistant endpoint

use axum::extract::State;

use crate::{
    error::AppResult,
    models::chat::{ChatReply, ChatRequest},
    AppState,
};

use super::{ApiJson, Envelope};

/// Converse with the travel assistant, or book through it
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatReply),
        (status = 400, description = "Empty conversation or invalid booking"),
        (status = 404, description = "Booked package not found")
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> AppResult<Envelope<ChatReply>> {
    let reply = state.services.chat.respond(request).await?;
    Ok(Envelope::success(reply))
}
