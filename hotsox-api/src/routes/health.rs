use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;

use hotsox_shared::clients::db;
use hotsox_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// Liveness plus a check of Postgres, Redis and RabbitMQ.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let database = match db::connection(&state.db)
        .and_then(|mut conn| diesel::sql_query("SELECT 1").execute(&mut conn).map_err(Into::into))
    {
        Ok(_) => HealthCheck::passed("database"),
        Err(e) => HealthCheck::failed("database", e.to_string()),
    };

    let redis = match state.redis.ping().await {
        Ok(()) => HealthCheck::passed("redis"),
        Err(e) => HealthCheck::failed("redis", e.to_string()),
    };

    let rabbitmq = if state.rabbitmq.is_connected() {
        HealthCheck::passed("rabbitmq")
    } else {
        HealthCheck::failed("rabbitmq", "channel closed")
    };

    let response = HealthResponse::healthy("hotsox-api", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![database, redis, rabbitmq]);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
