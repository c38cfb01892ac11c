use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use hotsox_shared::clients::db;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};
use hotsox_shared::types::auth::AuthUser;
use hotsox_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::{MessageChat, NewMessageChat};
use crate::schema::message_chats;
use crate::services::{match_service, user_service};
use crate::AppState;

// --- GET /user/chat ---

pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MessageChat>>>> {
    let mut conn = db::connection(&state.db)?;
    let (offset, limit) = params.sql_window();
    let mine = message_chats::user_id.eq(user.id).or(message_chats::other_id.eq(user.id));

    let total = message_chats::table
        .filter(mine.clone())
        .count()
        .get_result::<i64>(&mut conn)?;

    let messages = message_chats::table
        .filter(mine)
        .order(message_chats::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<MessageChat>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(messages, total as u64, &params))))
}

// --- GET /user/chat/:username ---

pub async fn conversation(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<MessageChat>>>> {
    let mut conn = db::connection(&state.db)?;
    let other = user_service::find_by_username(&mut conn, &username)?;

    if match_service::pair_rows(&mut conn, user.id, other.id)?.is_empty() {
        return Err(AppError::new(ErrorCode::NotMatched, format!("you are not matched with {username}")));
    }

    diesel::update(
        message_chats::table
            .filter(message_chats::user_id.eq(other.id))
            .filter(message_chats::other_id.eq(user.id))
            .filter(message_chats::seen.eq(false)),
    )
    .set(message_chats::seen.eq(true))
    .execute(&mut conn)?;

    let messages = message_chats::table
        .filter(
            message_chats::user_id
                .eq(user.id)
                .and(message_chats::other_id.eq(other.id))
                .or(message_chats::user_id.eq(other.id).and(message_chats::other_id.eq(user.id))),
        )
        .order(message_chats::created_at.asc())
        .load::<MessageChat>(&mut conn)?;

    Ok(Json(ApiResponse::ok(messages)))
}

// --- POST /user/chat/:username ---

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(max = 5000))]
    pub message: String,
}

pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MessageChat>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyMessage, "message must not be empty"));
    }

    let mut conn = db::connection(&state.db)?;
    let other = user_service::find_by_username(&mut conn, &username)?;

    let state_of_pair = match_service::pair_state(&mut conn, user.id, other.id)?;
    if !state_of_pair.is_some_and(|s| s.allows_chat()) {
        return Err(AppError::new(ErrorCode::NotMatched, format!("you are not matched with {username}")));
    }

    let chat = diesel::insert_into(message_chats::table)
        .values(&NewMessageChat {
            user_id: user.id,
            other_id: other.id,
            message: message.to_string(),
        })
        .get_result::<MessageChat>(&mut conn)?;

    tracing::info!(user_id = %user.id, other_id = %other.id, "chat message sent");

    Ok(ApiResponse::created(chat))
}
