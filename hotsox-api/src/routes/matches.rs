use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use hotsox_shared::clients::db;
use hotsox_shared::errors::AppResult;
use hotsox_shared::types::auth::AuthUser;
use hotsox_shared::types::ApiResponse;

use crate::events::publisher;
use crate::services::match_service::{self, MatchDetails, MatchList};
use crate::services::user_service;
use crate::AppState;

// --- GET /match ---

pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MatchList>>> {
    let mut conn = db::connection(&state.db)?;
    let list = match_service::list_matches(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(list)))
}

// --- GET /match/:username ---

pub async fn match_details(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<MatchDetails>>> {
    let mut conn = db::connection(&state.db)?;
    let me = user_service::find_by_id(&mut conn, user.id)?;
    let details = match_service::match_details(&mut conn, &me, &username)?;
    Ok(Json(ApiResponse::ok(details)))
}

// --- DELETE /match/:username ---

pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    let (me, other) = {
        let mut conn = db::connection(&state.db)?;
        let me = user_service::find_by_id(&mut conn, user.id)?;
        let other = match_service::unmatch(&mut conn, &me, &username)?;
        (me, other)
    };

    // committed; notify both sides
    publisher::publish_unmatch_mails(&state.rabbitmq, &me, &other).await;

    Ok(StatusCode::NO_CONTENT)
}
