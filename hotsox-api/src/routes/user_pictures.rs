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

use crate::models::{NewUserProfilePicture, UserProfilePicture};
use crate::schema::user_profile_pictures;
use crate::services::{picture_service, user_service};
use crate::AppState;

// --- GET /user/profilepic ---

pub async fn list_pictures(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<UserProfilePicture>>>> {
    let mut conn = db::connection(&state.db)?;
    let pictures = user_service::user_pictures(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(pictures)))
}

// --- POST /user/profilepic ---

pub async fn upload_picture(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UserProfilePicture>>)> {
    let stored = picture_service::store_upload(&state.media, &mut multipart, |ext| {
        picture_service::user_picture_key(user.id, ext)
    })
    .await?;

    let mut conn = db::connection(&state.db)?;
    let picture = diesel::insert_into(user_profile_pictures::table)
        .values(&NewUserProfilePicture {
            user_id: user.id,
            profile_picture: stored.url,
            storage_key: stored.key,
        })
        .get_result::<UserProfilePicture>(&mut conn)?;

    tracing::info!(user_id = %user.id, picture_id = %picture.id, "profile picture uploaded");

    Ok(ApiResponse::created(picture))
}

// --- DELETE /user/profilepic/:id ---

pub async fn delete_picture(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(picture_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let mut conn = db::connection(&state.db)?;

    let picture = user_profile_pictures::table
        .find(picture_id)
        .first::<UserProfilePicture>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PictureNotFound, "picture not found"))?;

    if picture.user_id != user.id {
        return Err(AppError::new(ErrorCode::Forbidden, "this picture belongs to someone else"));
    }

    diesel::delete(user_profile_pictures::table.find(picture.id)).execute(&mut conn)?;
    picture_service::remove_object(&state.media, &picture.storage_key).await;

    tracing::info!(user_id = %user.id, picture_id = %picture.id, "profile picture deleted");

    Ok(StatusCode::NO_CONTENT)
}
