use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use hotsox_shared::clients::db::DbConn;
use hotsox_shared::clients::redis::RedisClient;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Sock, SockLike, SockProfilePicture};
use crate::schema::{sock_likes, sock_profile_pictures, socks};

const SELECTION_TTL_SECS: u64 = 30 * 24 * 3600;

#[derive(Debug, Serialize)]
pub struct SockDetail {
    #[serde(flatten)]
    pub sock: Sock,
    pub pictures: Vec<SockProfilePicture>,
    pub likes: Vec<SockLike>,
}

pub fn find_sock(conn: &mut DbConn, sock_id: Uuid) -> AppResult<Sock> {
    socks::table
        .find(sock_id)
        .first::<Sock>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::SockNotFound, "sock not found"))
}

/// Loads a sock and checks that `user_id` owns it.
pub fn owned_sock(conn: &mut DbConn, user_id: Uuid, sock_id: Uuid) -> AppResult<Sock> {
    let sock = find_sock(conn, sock_id)?;
    if sock.user_id != user_id {
        return Err(AppError::new(ErrorCode::NotSockOwner, "this sock belongs to someone else"));
    }
    Ok(sock)
}

pub fn socks_of_user(conn: &mut DbConn, user_id: Uuid) -> AppResult<Vec<Sock>> {
    Ok(socks::table
        .filter(socks::user_id.eq(user_id))
        .order(socks::info_joining_date.asc())
        .load::<Sock>(conn)?)
}

pub fn sock_pictures(conn: &mut DbConn, sock_id: Uuid) -> AppResult<Vec<SockProfilePicture>> {
    Ok(sock_profile_pictures::table
        .filter(sock_profile_pictures::sock_id.eq(sock_id))
        .order(sock_profile_pictures::created_at.asc())
        .load::<SockProfilePicture>(conn)?)
}

pub fn sock_detail(conn: &mut DbConn, sock: Sock) -> AppResult<SockDetail> {
    let pictures = sock_pictures(conn, sock.id)?;
    let likes = sock_likes::table
        .filter(sock_likes::sock_id.eq(sock.id))
        .order(sock_likes::created_at.desc())
        .load::<SockLike>(conn)?;
    Ok(SockDetail { sock, pictures, likes })
}

pub fn sock_details(conn: &mut DbConn, socks: Vec<Sock>) -> AppResult<Vec<SockDetail>> {
    socks.into_iter().map(|sock| sock_detail(conn, sock)).collect()
}

// --- Selected sock ---

pub fn selection_key(user_id: Uuid) -> String {
    format!("hotsox:selected_sock:{user_id}")
}

pub async fn selected_sock_id(redis: &RedisClient, user_id: Uuid) -> AppResult<Option<Uuid>> {
    let raw = redis
        .get(&selection_key(user_id))
        .await
        .map_err(|e| AppError::internal(format!("redis error: {e}")))?;
    Ok(raw.and_then(|s| s.parse::<Uuid>().ok()))
}

pub async fn select_sock(redis: &RedisClient, user_id: Uuid, sock_id: Uuid) -> AppResult<()> {
    redis
        .set(&selection_key(user_id), &sock_id.to_string(), SELECTION_TTL_SECS)
        .await
        .map_err(|e| AppError::internal(format!("redis error: {e}")))
}

/// Drops the selection if it points at `sock_id`.
pub async fn clear_selection_of(redis: &RedisClient, user_id: Uuid, sock_id: Uuid) {
    match selected_sock_id(redis, user_id).await {
        Ok(Some(selected)) if selected == sock_id => {
            if let Err(e) = redis.del(&selection_key(user_id)).await {
                tracing::warn!(error = %e, user_id = %user_id, "failed to clear sock selection");
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, user_id = %user_id, "failed to read sock selection"),
    }
}

/// The sock a swipe acts for: the explicit one, else the selected one. Must be owned by `user_id`.
pub async fn acting_sock(
    conn: &mut DbConn,
    redis: &RedisClient,
    user_id: Uuid,
    explicit: Option<Uuid>,
) -> AppResult<Sock> {
    let sock_id = match explicit {
        Some(id) => id,
        None => selected_sock_id(redis, user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::NoSockSelected, "no sock selected, pass sock_id or select one"))?,
    };
    owned_sock(conn, user_id, sock_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_key_is_namespaced_per_user() {
        let id = Uuid::nil();
        assert_eq!(
            selection_key(id),
            "hotsox:selected_sock:00000000-0000-0000-0000-000000000000"
        );
    }
}
