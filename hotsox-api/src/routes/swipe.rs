use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use hotsox_shared::clients::db;
use hotsox_shared::errors::AppResult;
use hotsox_shared::types::auth::AuthUser;
use hotsox_shared::types::ApiResponse;

use crate::services::match_service::{self, Candidate, SwipeOutcome};
use crate::services::sock_service;
use crate::AppState;

// --- GET /swipe ---

#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    pub sock_id: Option<Uuid>,
}

pub async fn next_candidate(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<CandidateQuery>,
) -> AppResult<Json<ApiResponse<Option<Candidate>>>> {
    let mut conn = db::connection(&state.db)?;
    let my_sock = sock_service::acting_sock(&mut conn, &state.redis, user.id, query.sock_id).await?;
    let candidate = match_service::next_candidate(&mut conn, user.id, &my_sock)?;
    Ok(Json(ApiResponse::ok(candidate)))
}

// --- POST /swipe ---

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub sock_id: Option<Uuid>,
    pub other_sock_id: Uuid,
    pub liked: bool,
}

pub async fn swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeOutcome>>> {
    let mut conn = db::connection(&state.db)?;
    let my_sock = sock_service::acting_sock(&mut conn, &state.redis, user.id, req.sock_id).await?;
    let outcome = match_service::swipe(&mut conn, user.id, &my_sock, req.other_sock_id, req.liked)?;
    Ok(Json(ApiResponse::ok(outcome)))
}
