use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use hotsox_shared::clients::db;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};
use hotsox_shared::types::auth::AuthUser;
use hotsox_shared::types::ApiResponse;

use crate::domain::sock::SockChoices;
use crate::models::{NewSock, Sock, UpdateSock};
use crate::schema::socks;
use crate::services::picture_service;
use crate::services::sock_service::{self, SockDetail};
use crate::AppState;

// --- GET /sock ---

pub async fn list_socks(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<SockDetail>>>> {
    let mut conn = db::connection(&state.db)?;
    let socks = sock_service::socks_of_user(&mut conn, user.id)?;
    let details = sock_service::sock_details(&mut conn, socks)?;
    Ok(Json(ApiResponse::ok(details)))
}

// --- POST /sock ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSockRequest {
    #[validate(length(min = 1, max = 50))]
    pub info_name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub info_about: String,
    pub info_color: String,
    pub info_fabric: String,
    pub info_fabric_thickness: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub info_brand: String,
    pub info_type: String,
    pub info_size: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub info_age: i32,
    pub info_separation_date: Option<NaiveDate>,
    pub info_condition: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 1000))]
    pub info_holes: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub info_kilometers: i32,
    pub info_inoutdoor: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub info_washed: i32,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub info_special: String,
}

impl CreateSockRequest {
    fn choices(&self) -> SockChoices<'_> {
        SockChoices {
            color: Some(&self.info_color),
            fabric: Some(&self.info_fabric),
            fabric_thickness: Some(&self.info_fabric_thickness),
            sock_type: Some(&self.info_type),
            size: Some(&self.info_size),
            condition: Some(&self.info_condition),
            inoutdoor: Some(&self.info_inoutdoor),
        }
    }

    fn into_new_sock(self, user_id: Uuid) -> NewSock {
        NewSock {
            user_id,
            info_name: self.info_name.trim().to_string(),
            info_about: self.info_about,
            info_color: self.info_color,
            info_fabric: self.info_fabric,
            info_fabric_thickness: self.info_fabric_thickness,
            info_brand: self.info_brand,
            info_type: self.info_type,
            info_size: self.info_size,
            info_age: self.info_age,
            info_separation_date: self.info_separation_date,
            info_condition: self.info_condition,
            info_holes: self.info_holes,
            info_kilometers: self.info_kilometers,
            info_inoutdoor: self.info_inoutdoor,
            info_washed: self.info_washed,
            info_special: self.info_special,
        }
    }
}

pub async fn create_sock(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSockRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Sock>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    req.choices().validate()?;

    let mut conn = db::connection(&state.db)?;
    let sock = diesel::insert_into(socks::table)
        .values(&req.into_new_sock(user.id))
        .get_result::<Sock>(&mut conn)?;

    // a fresh sock becomes the one the user swipes with
    sock_service::select_sock(&state.redis, user.id, sock.id).await?;

    tracing::info!(user_id = %user.id, sock_id = %sock.id, "sock created");

    Ok(ApiResponse::created(sock))
}

// --- GET /sock/:id ---

pub async fn get_sock(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(sock_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SockDetail>>> {
    let mut conn = db::connection(&state.db)?;
    let sock = sock_service::owned_sock(&mut conn, user.id, sock_id)?;
    let detail = sock_service::sock_detail(&mut conn, sock)?;
    Ok(Json(ApiResponse::ok(detail)))
}

// --- PUT /sock/:id ---

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSockRequest {
    #[validate(length(min = 1, max = 50))]
    pub info_name: Option<String>,
    #[validate(length(max = 2000))]
    pub info_about: Option<String>,
    pub info_color: Option<String>,
    pub info_fabric: Option<String>,
    pub info_fabric_thickness: Option<String>,
    #[validate(length(max = 50))]
    pub info_brand: Option<String>,
    pub info_type: Option<String>,
    pub info_size: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub info_age: Option<i32>,
    pub info_separation_date: Option<NaiveDate>,
    pub info_condition: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    pub info_holes: Option<i32>,
    #[validate(range(min = 0))]
    pub info_kilometers: Option<i32>,
    pub info_inoutdoor: Option<String>,
    #[validate(range(min = 0))]
    pub info_washed: Option<i32>,
    #[validate(length(max = 2000))]
    pub info_special: Option<String>,
}

impl UpdateSockRequest {
    fn choices(&self) -> SockChoices<'_> {
        SockChoices {
            color: self.info_color.as_deref(),
            fabric: self.info_fabric.as_deref(),
            fabric_thickness: self.info_fabric_thickness.as_deref(),
            sock_type: self.info_type.as_deref(),
            size: self.info_size.as_deref(),
            condition: self.info_condition.as_deref(),
            inoutdoor: self.info_inoutdoor.as_deref(),
        }
    }
}

impl From<UpdateSockRequest> for UpdateSock {
    fn from(req: UpdateSockRequest) -> Self {
        Self {
            info_name: req.info_name.map(|n| n.trim().to_string()),
            info_about: req.info_about,
            info_color: req.info_color,
            info_fabric: req.info_fabric,
            info_fabric_thickness: req.info_fabric_thickness,
            info_brand: req.info_brand,
            info_type: req.info_type,
            info_size: req.info_size,
            info_age: req.info_age,
            info_separation_date: req.info_separation_date,
            info_condition: req.info_condition,
            info_holes: req.info_holes,
            info_kilometers: req.info_kilometers,
            info_inoutdoor: req.info_inoutdoor,
            info_washed: req.info_washed,
            info_special: req.info_special,
        }
    }
}

pub async fn update_sock(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(sock_id): Path<Uuid>,
    Json(req): Json<UpdateSockRequest>,
) -> AppResult<Json<ApiResponse<Sock>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    req.choices().validate()?;

    let mut conn = db::connection(&state.db)?;
    let sock = sock_service::owned_sock(&mut conn, user.id, sock_id)?;

    let updated = diesel::update(socks::table.find(sock.id))
        .set((&UpdateSock::from(req), socks::updated_at.eq(Utc::now())))
        .get_result::<Sock>(&mut conn)?;

    tracing::info!(user_id = %user.id, sock_id = %sock.id, "sock updated");

    Ok(Json(ApiResponse::ok(updated)))
}

// --- DELETE /sock/:id ---

pub async fn delete_sock(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(sock_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let mut conn = db::connection(&state.db)?;
    let sock = sock_service::owned_sock(&mut conn, user.id, sock_id)?;
    let pictures = sock_service::sock_pictures(&mut conn, sock.id)?;

    diesel::delete(socks::table.find(sock.id)).execute(&mut conn)?;

    for picture in &pictures {
        picture_service::remove_object(&state.media, &picture.storage_key).await;
    }
    sock_service::clear_selection_of(&state.redis, user.id, sock.id).await;

    tracing::info!(user_id = %user.id, sock_id = %sock.id, "sock deleted");

    Ok(StatusCode::NO_CONTENT)
}

// --- GET/PUT /sock/selection ---

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub sock: Option<Sock>,
}

pub async fn get_selection(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<SelectionResponse>>> {
    let selected = sock_service::selected_sock_id(&state.redis, user.id).await?;

    let mut conn = db::connection(&state.db)?;
    let sock = match selected {
        Some(id) => socks::table
            .find(id)
            .filter(socks::user_id.eq(user.id))
            .first::<Sock>(&mut conn)
            .optional()?,
        None => None,
    };

    Ok(Json(ApiResponse::ok(SelectionResponse { sock })))
}

#[derive(Debug, Deserialize)]
pub struct SelectSockRequest {
    pub sock_id: Uuid,
}

pub async fn set_selection(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectSockRequest>,
) -> AppResult<Json<ApiResponse<SelectionResponse>>> {
    let mut conn = db::connection(&state.db)?;
    let sock = sock_service::owned_sock(&mut conn, user.id, req.sock_id)?;

    sock_service::select_sock(&state.redis, user.id, sock.id).await?;

    tracing::info!(user_id = %user.id, sock_id = %sock.id, "sock selected");

    Ok(Json(ApiResponse::ok(SelectionResponse { sock: Some(sock) })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_json() -> serde_json::Value {
        serde_json::json!({
            "info_name": "  Lefty ",
            "info_color": "red",
            "info_fabric": "wool",
            "info_fabric_thickness": "thick",
            "info_type": "crew",
            "info_size": "m",
            "info_condition": "used",
            "info_inoutdoor": "indoor"
        })
    }

    #[test]
    fn create_request_defaults_and_trims() {
        let req: CreateSockRequest = serde_json::from_value(create_json()).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.choices().validate().is_ok());
        let new_sock = req.into_new_sock(Uuid::nil());
        assert_eq!(new_sock.info_name, "Lefty");
        assert_eq!(new_sock.info_holes, 0);
        assert!(new_sock.info_separation_date.is_none());
    }

    #[test]
    fn create_request_rejects_negative_counters() {
        let mut json = create_json();
        json["info_holes"] = serde_json::json!(-1);
        let req: CreateSockRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_checks_only_given_choices() {
        let req = UpdateSockRequest {
            info_size: Some("gigantic".into()),
            ..Default::default()
        };
        assert!(req.choices().validate().is_err());

        let req = UpdateSockRequest {
            info_brand: Some("Falke".into()),
            ..Default::default()
        };
        assert!(req.choices().validate().is_ok());
        assert_eq!(UpdateSock::from(req).info_brand.as_deref(), Some("Falke"));
    }
}
