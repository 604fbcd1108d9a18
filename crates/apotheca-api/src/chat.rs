use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use apotheca_core::ServiceError;
use apotheca_types::api::{
    Claims, CreateConversationRequest, MarkReadResponse, SendMessageRequest, SuccessResponse,
};
use apotheca_types::models::{Conversation, Message};

use crate::auth::AppState;
use crate::error::{ApiResult, blocking};

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub limit: Option<u32>,
    /// Id of the oldest message of the previous page.
    pub cursor: Option<String>,
}

pub async fn get_or_create_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateConversationRequest>,
) -> ApiResult<Json<Conversation>> {
    let conversation = blocking(move || {
        if claims.sub != req.user_id && claims.sub != req.pharmacy_owner_id {
            return Err(ServiceError::Forbidden(
                "You can only open conversations you take part in".into(),
            ));
        }
        state
            .chat
            .get_or_create(&req.user_id, &req.pharmacy_owner_id, &req.pharmacy_id)
    })
    .await?;
    Ok(Json(conversation))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<Conversation>>> {
    let conversations = blocking(move || {
        let me = state.chat.participant(&claims.sub)?;
        state.chat.list_conversations(&me)
    })
    .await?;
    Ok(Json(conversations))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Conversation>> {
    let conversation =
        blocking(move || state.chat.get_conversation(&conversation_id, &claims.sub)).await?;
    Ok(Json(conversation))
}

pub async fn archive_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse>> {
    blocking(move || state.chat.archive(&conversation_id, &claims.sub)).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let message = blocking(move || {
        let sender = state.chat.participant(&claims.sub)?;
        state
            .chat
            .send_message(&conversation_id, &sender, req.content, req.image_url)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<MessageQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages = blocking(move || {
        state.chat.get_messages(
            &conversation_id,
            &claims.sub,
            query.limit,
            query.cursor.as_deref(),
        )
    })
    .await?;
    Ok(Json(messages))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<MarkReadResponse>> {
    let marked_count = blocking(move || {
        let reader = state.chat.participant(&claims.sub)?;
        state.chat.mark_read(&conversation_id, &reader.id, reader.side)
    })
    .await?;
    Ok(Json(MarkReadResponse {
        success: true,
        marked_count,
    }))
}
