use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{
    message_chats, message_mails, refresh_tokens, sock_likes, sock_profile_pictures, socks,
    user_matches, user_profile_pictures, users,
};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub info_about: String,
    pub info_birthday: NaiveDate,
    pub info_gender: String,
    pub info_gender_preference: String,
    pub location_city: String,
    pub location_latitude: f64,
    pub location_longitude: f64,
    pub notification: bool,
    pub is_active: bool,
    pub role: String,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub info_about: String,
    pub info_birthday: NaiveDate,
    pub info_gender: String,
    pub info_gender_preference: String,
    pub location_city: String,
    pub notification: bool,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub info_about: Option<String>,
    pub info_birthday: Option<NaiveDate>,
    pub info_gender: Option<String>,
    pub info_gender_preference: Option<String>,
    pub location_city: Option<String>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    pub notification: Option<bool>,
}

// --- Profile pictures ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_profile_pictures)]
pub struct UserProfilePicture {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub profile_picture: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_profile_pictures)]
pub struct NewUserProfilePicture {
    pub user_id: Uuid,
    pub profile_picture: String,
    pub storage_key: String,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = sock_profile_pictures)]
pub struct SockProfilePicture {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub sock_id: Uuid,
    pub profile_picture: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sock_profile_pictures)]
pub struct NewSockProfilePicture {
    pub sock_id: Uuid,
    pub profile_picture: String,
    pub storage_key: String,
}

// --- Sock ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = socks)]
pub struct Sock {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub info_joining_date: DateTime<Utc>,
    pub info_name: String,
    pub info_about: String,
    pub info_color: String,
    pub info_fabric: String,
    pub info_fabric_thickness: String,
    pub info_brand: String,
    pub info_type: String,
    pub info_size: String,
    pub info_age: i32,
    pub info_separation_date: Option<NaiveDate>,
    pub info_condition: String,
    pub info_holes: i32,
    pub info_kilometers: i32,
    pub info_inoutdoor: String,
    pub info_washed: i32,
    pub info_special: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = socks)]
pub struct NewSock {
    pub user_id: Uuid,
    pub info_name: String,
    pub info_about: String,
    pub info_color: String,
    pub info_fabric: String,
    pub info_fabric_thickness: String,
    pub info_brand: String,
    pub info_type: String,
    pub info_size: String,
    pub info_age: i32,
    pub info_separation_date: Option<NaiveDate>,
    pub info_condition: String,
    pub info_holes: i32,
    pub info_kilometers: i32,
    pub info_inoutdoor: String,
    pub info_washed: i32,
    pub info_special: String,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = socks)]
pub struct UpdateSock {
    pub info_name: Option<String>,
    pub info_about: Option<String>,
    pub info_color: Option<String>,
    pub info_fabric: Option<String>,
    pub info_fabric_thickness: Option<String>,
    pub info_brand: Option<String>,
    pub info_type: Option<String>,
    pub info_size: Option<String>,
    pub info_age: Option<i32>,
    pub info_separation_date: Option<NaiveDate>,
    pub info_condition: Option<String>,
    pub info_holes: Option<i32>,
    pub info_kilometers: Option<i32>,
    pub info_inoutdoor: Option<String>,
    pub info_washed: Option<i32>,
    pub info_special: Option<String>,
}

// --- Swipes ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = sock_likes)]
pub struct SockLike {
    pub id: Uuid,
    pub sock_id: Uuid,
    pub like_id: Uuid,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sock_likes)]
pub struct NewSockLike {
    pub sock_id: Uuid,
    pub like_id: Uuid,
    pub liked: bool,
}

// --- Matches ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_matches)]
pub struct UserMatch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub other_id: Uuid,
    pub sock_id: Option<Uuid>,
    pub other_sock_id: Option<Uuid>,
    pub unmatched: bool,
    pub created_at: DateTime<Utc>,
    pub unmatched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_matches)]
pub struct NewUserMatch {
    pub user_id: Uuid,
    pub other_id: Uuid,
    pub sock_id: Option<Uuid>,
    pub other_sock_id: Option<Uuid>,
}

// --- Chat ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = message_chats)]
pub struct MessageChat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub other_id: Uuid,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = message_chats)]
pub struct NewMessageChat {
    pub user_id: Uuid,
    pub other_id: Uuid,
    pub message: String,
}

// --- Mail ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = message_mails)]
pub struct MessageMail {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = message_mails)]
pub struct NewMessageMail {
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
}

// --- Refresh tokens ---

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = refresh_tokens)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
