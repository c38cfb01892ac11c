use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use hotsox_shared::clients::db;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};
use hotsox_shared::types::auth::{AuthUser, TokenPair};
use hotsox_shared::types::ApiResponse;

use crate::models::{RefreshToken, User};
use crate::schema::{refresh_tokens, users};
use crate::services::{auth_service, token_service, user_service};
use crate::AppState;

// --- POST /auth/token ---

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

pub async fn token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let mut conn = db::connection(&state.db)?;

    let user: User = users::table
        .filter(users::username.eq(&req.username))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "incorrect username or password"))?;

    if !auth_service::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::new(ErrorCode::InvalidCredentials, "incorrect username or password"));
    }
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountInactive, "account is inactive"));
    }

    let pair = token_service::issue_token_pair(&mut conn, &user, &state.config)?;

    diesel::update(users::table.find(user.id))
        .set(users::last_login.eq(Some(Utc::now())))
        .execute(&mut conn)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(ApiResponse::ok(pair)))
}

// --- POST /auth/refresh ---

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let token_hash = token_service::hash_token(&req.refresh_token);
    let mut conn = db::connection(&state.db)?;

    let stored: RefreshToken = refresh_tokens::table
        .filter(refresh_tokens::token_hash.eq(&token_hash))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid, "invalid refresh token"))?;

    if stored.revoked {
        return Err(AppError::new(ErrorCode::RefreshTokenRevoked, "refresh token has been revoked"));
    }
    if stored.expires_at < Utc::now() {
        return Err(AppError::new(ErrorCode::TokenExpired, "refresh token expired"));
    }

    // rotate: the presented token is single use
    diesel::update(refresh_tokens::table.find(stored.id))
        .set(refresh_tokens::revoked.eq(true))
        .execute(&mut conn)?;

    let user = user_service::find_by_id(&mut conn, stored.user_id)?;
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountInactive, "account is inactive"));
    }

    let pair = token_service::issue_token_pair(&mut conn, &user, &state.config)?;

    Ok(Json(ApiResponse::ok(pair)))
}

// --- POST /auth/logout ---

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

pub async fn logout(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogoutRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let token_hash = token_service::hash_token(&req.refresh_token);
    let mut conn = db::connection(&state.db)?;

    diesel::update(
        refresh_tokens::table
            .filter(refresh_tokens::token_hash.eq(&token_hash))
            .filter(refresh_tokens::user_id.eq(user.id))
            .filter(refresh_tokens::revoked.eq(false)),
    )
    .set(refresh_tokens::revoked.eq(true))
    .execute(&mut conn)?;

    tracing::info!(user_id = %user.id, "user logged out");

    Ok(Json(ApiResponse::ok("logged out")))
}
