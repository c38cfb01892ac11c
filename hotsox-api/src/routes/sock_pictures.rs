use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use hotsox_shared::clients::db;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};
use hotsox_shared::types::auth::AuthUser;
use hotsox_shared::types::ApiResponse;

use crate::models::{NewSockProfilePicture, SockProfilePicture};
use crate::schema::sock_profile_pictures;
use crate::services::{picture_service, sock_service};
use crate::AppState;

// --- GET /sock/:id/profilepic ---

pub async fn list_pictures(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(sock_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<SockProfilePicture>>>> {
    let mut conn = db::connection(&state.db)?;
    let sock = sock_service::owned_sock(&mut conn, user.id, sock_id)?;
    let pictures = sock_service::sock_pictures(&mut conn, sock.id)?;
    Ok(Json(ApiResponse::ok(pictures)))
}

// --- POST /sock/:id/profilepic ---

pub async fn upload_picture(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(sock_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<SockProfilePicture>>)> {
    let sock = {
        let mut conn = db::connection(&state.db)?;
        sock_service::owned_sock(&mut conn, user.id, sock_id)?
    };

    let stored = picture_service::store_upload(&state.media, &mut multipart, |ext| {
        picture_service::sock_picture_key(sock.id, ext)
    })
    .await?;

    let mut conn = db::connection(&state.db)?;
    let picture = diesel::insert_into(sock_profile_pictures::table)
        .values(&NewSockProfilePicture {
            sock_id: sock.id,
            profile_picture: stored.url,
            storage_key: stored.key,
        })
        .get_result::<SockProfilePicture>(&mut conn)?;

    tracing::info!(user_id = %user.id, sock_id = %sock.id, picture_id = %picture.id, "sock picture uploaded");

    Ok(ApiResponse::created(picture))
}

// --- DELETE /sock/:id/profilepic/:pic_id ---

pub async fn delete_picture(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((sock_id, picture_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let mut conn = db::connection(&state.db)?;
    let sock = sock_service::owned_sock(&mut conn, user.id, sock_id)?;

    let picture = sock_profile_pictures::table
        .find(picture_id)
        .filter(sock_profile_pictures::sock_id.eq(sock.id))
        .first::<SockProfilePicture>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PictureNotFound, "picture not found on this sock"))?;

    diesel::delete(sock_profile_pictures::table.find(picture.id)).execute(&mut conn)?;
    picture_service::remove_object(&state.media, &picture.storage_key).await;

    tracing::info!(user_id = %user.id, sock_id = %sock.id, picture_id = %picture.id, "sock picture deleted");

    Ok(StatusCode::NO_CONTENT)
}
