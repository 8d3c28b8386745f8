use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::{conversation, message};
use service::db::{messaging_service::{self, ConversationSummary}, user_service::UserSummary};

use crate::auth::CurrentUser;
use crate::errors::JsonApiError;
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct StartConversation {
    pub participant_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MessageInput {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked: u64,
}

/// 201 when the conversation was created, 200 when the pair already had one.
#[utoipa::path(post, path = "/api/conversations", tag = "messaging", request_body = crate::openapi::StartConversationRequest, responses((status = 201, description = "Created"), (status = 200, description = "Existing conversation"), (status = 400, description = "Self conversation"), (status = 404, description = "Unknown participant")))]
pub async fn start_conversation(State(state): State<ServerState>, me: CurrentUser, Json(input): Json<StartConversation>) -> Result<(StatusCode, Json<conversation::Model>), JsonApiError> {
    let (conv, created) = messaging_service::start_conversation(&state.db, me.id, input.participant_id).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(conv)))
}

#[utoipa::path(get, path = "/api/conversations", tag = "messaging", responses((status = 200, description = "Inbox, most recent first")))]
pub async fn list_conversations(State(state): State<ServerState>, me: CurrentUser) -> Result<Json<Vec<ConversationSummary>>, JsonApiError> {
    Ok(Json(messaging_service::list_conversations(&state.db, me.id).await?))
}

pub async fn list_messages(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>, Query(page): Query<Pagination>) -> Result<Json<Page<message::Model>>, JsonApiError> {
    let items = messaging_service::list_messages(&state.db, me.id, id, page).await?;
    let (page, per_page) = page.echo();
    Ok(Json(Page { items, page, per_page }))
}

#[utoipa::path(post, path = "/api/conversations/{id}/messages", tag = "messaging", request_body = crate::openapi::MessageRequest, responses((status = 201, description = "Sent"), (status = 403, description = "Not a participant")))]
pub async fn send_message(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>, Json(input): Json<MessageInput>) -> Result<(StatusCode, Json<message::Model>), JsonApiError> {
    let sent = messaging_service::send_message(&state.db, me.id, id, &input.content).await?;
    Ok((StatusCode::CREATED, Json(sent)))
}

pub async fn mark_read(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<Json<MarkedRead>, JsonApiError> {
    let marked = messaging_service::mark_read(&state.db, me.id, id).await?;
    Ok(Json(MarkedRead { marked }))
}

pub async fn contacts(State(state): State<ServerState>, me: CurrentUser) -> Result<Json<Vec<UserSummary>>, JsonApiError> {
    Ok(Json(messaging_service::contacts(&state.db, me.id).await?))
}
