use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use hotsox_shared::clients::db::DbConn;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};

use crate::domain::account::age_in_years;
use crate::models::{MessageChat, MessageMail, User, UserMatch, UserProfilePicture};
use crate::schema::{message_chats, message_mails, user_matches, user_profile_pictures, users};
use crate::services::sock_service::{self, SockDetail};

/// What other users get to see about someone.
#[derive(Debug, Serialize)]
pub struct UserCard {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub age: i32,
    pub location_city: String,
    pub pictures: Vec<UserProfilePicture>,
}

impl UserCard {
    fn build(user: &User, pictures: Vec<UserProfilePicture>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            age: age_in_years(user.info_birthday, Utc::now().date_naive()),
            location_city: user.location_city.clone(),
            pictures,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub age: i32,
    pub pictures: Vec<UserProfilePicture>,
    pub socks: Vec<SockDetail>,
    pub mails: Vec<MessageMail>,
    pub sent_chats: Vec<MessageChat>,
    pub matches: Vec<UserMatch>,
}

pub fn find_by_id(conn: &mut DbConn, user_id: Uuid) -> AppResult<User> {
    users::table
        .find(user_id)
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

pub fn find_by_username(conn: &mut DbConn, username: &str) -> AppResult<User> {
    users::table
        .filter(users::username.eq(username))
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, format!("user {username} not found")))
}

pub fn user_pictures(conn: &mut DbConn, user_id: Uuid) -> AppResult<Vec<UserProfilePicture>> {
    Ok(user_profile_pictures::table
        .filter(user_profile_pictures::user_id.eq(user_id))
        .order(user_profile_pictures::created_at.asc())
        .load::<UserProfilePicture>(conn)?)
}

pub fn public_card(conn: &mut DbConn, user: &User) -> AppResult<UserCard> {
    let pictures = user_pictures(conn, user.id)?;
    Ok(UserCard::build(user, pictures))
}

/// Cards for a page of users, loading all their pictures in one query.
pub fn public_cards(conn: &mut DbConn, users: &[User]) -> AppResult<Vec<UserCard>> {
    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let mut by_user: HashMap<Uuid, Vec<UserProfilePicture>> = HashMap::new();
    for pic in user_profile_pictures::table
        .filter(user_profile_pictures::user_id.eq_any(&ids))
        .order(user_profile_pictures::created_at.asc())
        .load::<UserProfilePicture>(conn)?
    {
        by_user.entry(pic.user_id).or_default().push(pic);
    }
    Ok(users
        .iter()
        .map(|u| UserCard::build(u, by_user.remove(&u.id).unwrap_or_default()))
        .collect())
}

pub fn active_matches(conn: &mut DbConn, user_id: Uuid) -> AppResult<Vec<UserMatch>> {
    Ok(user_matches::table
        .filter(user_matches::user_id.eq(user_id).or(user_matches::other_id.eq(user_id)))
        .filter(user_matches::unmatched.eq(false))
        .order(user_matches::created_at.desc())
        .load::<UserMatch>(conn)?)
}

pub fn user_detail(conn: &mut DbConn, user: User) -> AppResult<UserDetail> {
    let pictures = user_pictures(conn, user.id)?;
    let socks = sock_service::socks_of_user(conn, user.id)?;
    let socks = sock_service::sock_details(conn, socks)?;
    let mails = message_mails::table
        .filter(message_mails::user_id.eq(user.id))
        .order(message_mails::created_at.desc())
        .load::<MessageMail>(conn)?;
    let sent_chats = message_chats::table
        .filter(message_chats::user_id.eq(user.id))
        .order(message_chats::created_at.desc())
        .load::<MessageChat>(conn)?;
    let matches = active_matches(conn, user.id)?;

    Ok(UserDetail {
        age: age_in_years(user.info_birthday, Utc::now().date_naive()),
        user,
        pictures,
        socks,
        mails,
        sent_chats,
        matches,
    })
}

/// Storage keys of every picture the user owns, directly or through a sock.
pub fn owned_picture_keys(conn: &mut DbConn, user_id: Uuid) -> AppResult<Vec<String>> {
    use crate::schema::{sock_profile_pictures, socks};

    let mut keys = user_profile_pictures::table
        .filter(user_profile_pictures::user_id.eq(user_id))
        .select(user_profile_pictures::storage_key)
        .load::<String>(conn)?;
    let sock_keys = sock_profile_pictures::table
        .inner_join(socks::table)
        .filter(socks::user_id.eq(user_id))
        .select(sock_profile_pictures::storage_key)
        .load::<String>(conn)?;
    keys.extend(sock_keys);
    Ok(keys)
}
