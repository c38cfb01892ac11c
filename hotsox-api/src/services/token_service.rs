use chrono::{Duration, Utc};
use diesel::prelude::*;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use hotsox_shared::clients::db::DbConn;
use hotsox_shared::errors::{AppError, AppResult};
use hotsox_shared::middleware::sign_jwt;
use hotsox_shared::types::auth::{Claims, TokenPair, UserRole};

use crate::config::AppConfig;
use crate::models::{NewRefreshToken, User};
use crate::schema::refresh_tokens;

pub fn create_access_token(
    user_id: Uuid,
    username: &str,
    role: UserRole,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, username, role, ttl_secs);
    sign_jwt(&claims, secret)
}

pub fn create_refresh_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Issues an access/refresh pair for `user` and stores the refresh token hash.
pub fn issue_token_pair(conn: &mut DbConn, user: &User, config: &AppConfig) -> AppResult<TokenPair> {
    let role = user.role.parse::<UserRole>().unwrap_or(UserRole::User);
    let access_token = create_access_token(
        user.id,
        &user.username,
        role,
        &config.jwt_secret,
        config.jwt_access_ttl,
    )?;
    let refresh_token = create_refresh_token();

    let new_rt = NewRefreshToken {
        user_id: user.id,
        token_hash: hash_token(&refresh_token),
        expires_at: Utc::now() + Duration::seconds(config.jwt_refresh_ttl),
    };
    diesel::insert_into(refresh_tokens::table)
        .values(&new_rt)
        .execute(conn)?;

    Ok(TokenPair::new(access_token, refresh_token, config.jwt_access_ttl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotsox_shared::middleware::validate_jwt;

    #[test]
    fn refresh_tokens_are_random_hex() {
        let a = create_refresh_token();
        let b = create_refresh_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn token_hash_is_stable_sha256() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn access_token_round_trips_claims() {
        let id = Uuid::now_v7();
        let token = create_access_token(id, "alice", UserRole::User, "secret", 300).unwrap();
        let claims = validate_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 300);
        assert!(validate_jwt(&token, "other").is_err());
    }
}
