use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use hotsox_shared::errors::{AppError, ErrorCode};
use hotsox_shared::middleware::{extract_bearer_token, validate_jwt};

use crate::AppState;

const WINDOW_SECS: u64 = 60;

/// Address the request came from. `X-Forwarded-For` is only read when the
/// direct peer is one of `trusted_proxies`.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    let peer_ip = peer.map(|p| p.ip())?;
    if !trusted_proxies.contains(&peer_ip) {
        return Some(peer_ip);
    }

    // rightmost hop not added by one of our proxies
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.split(',')
                .rev()
                .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
                .find(|ip| !trusted_proxies.contains(ip))
        });
    Some(forwarded.unwrap_or(peer_ip))
}

/// Rate-limit identity: the authenticated user when the bearer token is
/// valid, else the client address.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_proxies: &[IpAddr],
    jwt_secret: &str,
) -> String {
    let user = extract_bearer_token(headers)
        .ok()
        .and_then(|token| validate_jwt(token, jwt_secret).ok())
        .filter(|claims| !claims.is_expired());
    if let Some(claims) = user {
        return format!("user:{}", claims.sub);
    }

    match client_ip(headers, peer, trusted_proxies) {
        Some(ip) => format!("ip:{ip}"),
        None => "unknown".to_string(),
    }
}

/// Fixed one-minute window per client. Redis failures let the request through.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(
        req.headers(),
        peer,
        &state.trusted_proxies,
        &state.config.jwt_secret,
    );
    let key = format!("hotsox:rl:{client}:{}", Utc::now().format("%Y%m%d%H%M"));

    match state
        .redis
        .rate_limit_check(&key, state.config.rate_limit_per_minute, WINDOW_SECS)
        .await
    {
        Ok(true) => next.run(req).await,
        Ok(false) => {
            tracing::warn!(client = %client, "rate limit exceeded");
            AppError::new(ErrorCode::RateLimited, "rate limit exceeded").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "rate limit check failed, allowing request");
            next.run(req).await
        }
    }
}
