use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use hotsox_shared::clients::db;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};
use hotsox_shared::types::auth::AuthUser;
use hotsox_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::MessageMail;
use crate::schema::message_mails;
use crate::AppState;

// --- GET /user/mail ---

pub async fn list_mails(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MessageMail>>>> {
    let mut conn = db::connection(&state.db)?;
    let (offset, limit) = params.sql_window();

    let total = message_mails::table
        .filter(message_mails::user_id.eq(user.id))
        .count()
        .get_result::<i64>(&mut conn)?;

    let mails = message_mails::table
        .filter(message_mails::user_id.eq(user.id))
        .order(message_mails::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<MessageMail>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(mails, total as u64, &params))))
}

// --- GET /user/mail/:id ---

pub async fn read_mail(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(mail_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MessageMail>>> {
    let mut conn = db::connection(&state.db)?;

    let mail = diesel::update(
        message_mails::table
            .filter(message_mails::id.eq(mail_id))
            .filter(message_mails::user_id.eq(user.id)),
    )
    .set(message_mails::seen.eq(true))
    .get_result::<MessageMail>(&mut conn)
    .optional()?
    .ok_or_else(|| AppError::new(ErrorCode::MailNotFound, "mail not found"))?;

    Ok(Json(ApiResponse::ok(mail)))
}

// --- DELETE /user/mail/:id ---

pub async fn delete_mail(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(mail_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let mut conn = db::connection(&state.db)?;

    let deleted = diesel::delete(
        message_mails::table
            .filter(message_mails::id.eq(mail_id))
            .filter(message_mails::user_id.eq(user.id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(AppError::new(ErrorCode::MailNotFound, "mail not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
