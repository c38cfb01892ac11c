use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, Claims};

/// State that knows the HS256 secret access tokens are signed with.
pub trait JwtSecret {
    fn jwt_secret(&self) -> &str;
}

impl<T: JwtSecret> JwtSecret for std::sync::Arc<T> {
    fn jwt_secret(&self) -> &str {
        (**self).jwt_secret()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: JwtSecret + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = validate_jwt(token, state.jwt_secret())?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
        }

        Ok(AuthUser::from(claims))
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::Unauthorized, "invalid authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "authorization header must use Bearer scheme"))
}

pub fn sign_jwt(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "token has expired")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::auth::UserRole;
    use axum::http::Request;
    use uuid::Uuid;

    struct Secret(&'static str);

    impl JwtSecret for Secret {
        fn jwt_secret(&self) -> &str {
            self.0
        }
    }

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/user/me");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn sign_then_validate() {
        let claims = Claims::new(Uuid::now_v7(), "sockfan", UserRole::User, 60);
        let token = sign_jwt(&claims, "secret").unwrap();
        let back = validate_jwt(&token, "secret").unwrap();
        assert_eq!(back.sub, claims.sub);
        assert_eq!(back.username, "sockfan");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new(Uuid::now_v7(), "sockfan", UserRole::User, 60);
        let token = sign_jwt(&claims, "secret-a").unwrap();
        let err = validate_jwt(&token, "secret-b").unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::TokenInvalid));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims::new(Uuid::now_v7(), "sockfan", UserRole::User, -120);
        let token = sign_jwt(&claims, "secret").unwrap();
        let err = validate_jwt(&token, "secret").unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::TokenExpired));
    }

    #[tokio::test]
    async fn extractor_accepts_bearer_token() {
        let claims = Claims::new(Uuid::now_v7(), "sockfan", UserRole::User, 60);
        let token = sign_jwt(&claims, "secret").unwrap();
        let mut parts = parts_with(Some(format!("Bearer {token}").as_str()));

        let user = AuthUser::from_request_parts(&mut parts, &Secret("secret")).await.unwrap();
        assert_eq!(user.id, claims.sub);
    }

    #[tokio::test]
    async fn extractor_rejects_missing_header() {
        let mut parts = parts_with(None);
        let err = AuthUser::from_request_parts(&mut parts, &Secret("secret")).await.unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::Unauthorized));
    }

    #[tokio::test]
    async fn extractor_rejects_other_schemes() {
        let mut parts = parts_with(Some("Token abcdef"));
        let err = AuthUser::from_request_parts(&mut parts, &Secret("secret")).await.unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::Unauthorized));
    }
}
