use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use hotsox_shared::clients::db;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};
use hotsox_shared::types::auth::AuthUser;
use hotsox_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::domain::account;
use crate::events::publisher;
use crate::models::{NewUser, UpdateUser, User};
use crate::schema::users;
use crate::services::sock_service;
use crate::services::user_service::{self, UserCard, UserDetail};
use crate::services::{auth_service, picture_service};
use crate::AppState;

fn default_true() -> bool {
    true
}

// --- POST /user ---

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub info_about: String,
    pub info_birthday: NaiveDate,
    pub info_gender: String,
    pub info_gender_preference: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub location_city: String,
    #[serde(default = "default_true")]
    pub notification: bool,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    account::validate_username(&req.username)?;
    account::validate_birthday(req.info_birthday, Utc::now().date_naive())?;
    account::validate_gender(&req.info_gender)?;
    account::validate_gender_preference(&req.info_gender_preference)?;
    auth_service::validate_password(&req.password, &req.username)?;

    let email = req.email.trim().to_lowercase();
    let mut conn = db::connection(&state.db)?;

    let username_taken = users::table
        .filter(users::username.eq(&req.username))
        .count()
        .get_result::<i64>(&mut conn)?
        > 0;
    if username_taken {
        return Err(AppError::new(ErrorCode::UsernameTaken, "a user with that username already exists"));
    }

    let email_taken = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result::<i64>(&mut conn)?
        > 0;
    if email_taken {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
    }

    let new_user = NewUser {
        username: req.username,
        email,
        password_hash: auth_service::hash_password(&req.password)?,
        first_name: account::title_case(&req.first_name),
        last_name: account::title_case(&req.last_name),
        info_about: req.info_about,
        info_birthday: req.info_birthday,
        info_gender: req.info_gender,
        info_gender_preference: req.info_gender_preference,
        location_city: req.location_city.trim().to_string(),
        notification: req.notification,
    };

    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(ApiResponse::created(user))
}

// --- GET /user ---

pub async fn list_users(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<UserCard>>>> {
    let mut conn = db::connection(&state.db)?;
    let (offset, limit) = params.sql_window();

    let total = users::table
        .filter(users::is_active.eq(true))
        .count()
        .get_result::<i64>(&mut conn)?;

    let page = users::table
        .filter(users::is_active.eq(true))
        .order(users::username.asc())
        .offset(offset)
        .limit(limit)
        .load::<User>(&mut conn)?;

    let cards = user_service::public_cards(&mut conn, &page)?;

    Ok(Json(ApiResponse::ok(Paginated::new(cards, total as u64, &params))))
}

// --- GET /user/me ---

pub async fn get_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserDetail>>> {
    let mut conn = db::connection(&state.db)?;
    let me = user_service::find_by_id(&mut conn, user.id)?;
    let detail = user_service::user_detail(&mut conn, me)?;
    Ok(Json(ApiResponse::ok(detail)))
}

// --- PUT /user/me ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 2000))]
    pub info_about: Option<String>,
    pub info_birthday: Option<NaiveDate>,
    pub info_gender: Option<String>,
    pub info_gender_preference: Option<String>,
    #[validate(length(max = 255))]
    pub location_city: Option<String>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    pub notification: Option<bool>,
}

impl UpdateUserRequest {
    fn into_changeset(self) -> AppResult<UpdateUser> {
        if let Some(username) = &self.username {
            account::validate_username(username)?;
        }
        if let Some(birthday) = self.info_birthday {
            account::validate_birthday(birthday, Utc::now().date_naive())?;
        }
        if let Some(gender) = &self.info_gender {
            account::validate_gender(gender)?;
        }
        if let Some(preference) = &self.info_gender_preference {
            account::validate_gender_preference(preference)?;
        }
        if self.location_latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
            return Err(AppError::Validation("location_latitude must be within -90..90".into()));
        }
        if self.location_longitude.is_some_and(|lon| !(-180.0..=180.0).contains(&lon)) {
            return Err(AppError::Validation("location_longitude must be within -180..180".into()));
        }

        Ok(UpdateUser {
            username: self.username,
            email: self.email.map(|e| e.trim().to_lowercase()),
            first_name: self.first_name.as_deref().map(account::title_case),
            last_name: self.last_name.as_deref().map(account::title_case),
            info_about: self.info_about,
            info_birthday: self.info_birthday,
            info_gender: self.info_gender,
            info_gender_preference: self.info_gender_preference,
            location_city: self.location_city.map(|c| c.trim().to_string()),
            location_latitude: self.location_latitude,
            location_longitude: self.location_longitude,
            notification: self.notification,
        })
    }
}

pub async fn update_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    let changes = req.into_changeset()?;

    let mut conn = db::connection(&state.db)?;

    if let Some(username) = &changes.username {
        let taken = users::table
            .filter(users::username.eq(username))
            .filter(users::id.ne(user.id))
            .count()
            .get_result::<i64>(&mut conn)?
            > 0;
        if taken {
            return Err(AppError::new(ErrorCode::UsernameTaken, "a user with that username already exists"));
        }
    }

    if let Some(email) = &changes.email {
        let taken = users::table
            .filter(users::email.eq(email))
            .filter(users::id.ne(user.id))
            .count()
            .get_result::<i64>(&mut conn)?
            > 0;
        if taken {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
        }
    }

    let updated = diesel::update(users::table.find(user.id))
        .set((&changes, users::updated_at.eq(Utc::now())))
        .get_result::<User>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(ApiResponse::ok(updated)))
}

// --- DELETE /user/me ---

pub async fn delete_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<StatusCode> {
    let (me, picture_keys, socks) = {
        let mut conn = db::connection(&state.db)?;
        let me = user_service::find_by_id(&mut conn, user.id)?;
        let picture_keys = user_service::owned_picture_keys(&mut conn, me.id)?;
        let socks = sock_service::socks_of_user(&mut conn, me.id)?;
        (me, picture_keys, socks)
    };

    publisher::publish_account_deleted(&state.rabbitmq, &me).await;

    // pictures, socks, swipes, matches, chats, mails and tokens cascade
    {
        let mut conn = db::connection(&state.db)?;
        diesel::delete(users::table.find(me.id)).execute(&mut conn)?;
    }

    for key in &picture_keys {
        picture_service::remove_object(&state.media, key).await;
    }
    for sock in &socks {
        sock_service::clear_selection_of(&state.redis, me.id, sock.id).await;
    }

    tracing::info!(user_id = %me.id, pictures = picture_keys.len(), "account deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_json(email: &str) -> serde_json::Value {
        serde_json::json!({
            "username": "alice",
            "email": email,
            "password": "socks4ever",
            "info_birthday": "1990-04-01",
            "info_gender": "female",
            "info_gender_preference": "everyone"
        })
    }

    #[test]
    fn register_defaults_optional_fields() {
        let req: RegisterRequest = serde_json::from_value(register_json("a@example.com")).unwrap();
        assert!(req.notification);
        assert!(req.first_name.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn register_rejects_bad_email() {
        let req: RegisterRequest = serde_json::from_value(register_json("not-an-email")).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_title_cases_and_lowercases() {
        let req: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "email": " Alice@Example.COM ",
            "first_name": "anna-LENA",
        }))
        .unwrap();
        let changes = req.into_changeset().unwrap();
        assert_eq!(changes.email.as_deref(), Some("alice@example.com"));
        assert_eq!(changes.first_name.as_deref(), Some("Anna-Lena"));
        assert!(changes.last_name.is_none());
    }

    #[test]
    fn update_validates_new_username() {
        let req: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({ "username": "sock_fan.2" })).unwrap();
        let changes = req.into_changeset().unwrap();
        assert_eq!(changes.username.as_deref(), Some("sock_fan.2"));

        let req: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({ "username": "no spaces" })).unwrap();
        assert!(req.into_changeset().is_err());

        let req: UpdateUserRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.into_changeset().unwrap().username.is_none());
    }

    #[test]
    fn update_rejects_minor_birthday_and_bad_coordinates() {
        let today = Utc::now().date_naive();
        let req: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "info_birthday": today.to_string(),
        }))
        .unwrap();
        assert!(req.into_changeset().is_err());

        let req: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "location_latitude": 123.0,
        }))
        .unwrap();
        assert!(req.into_changeset().is_err());
    }
}
