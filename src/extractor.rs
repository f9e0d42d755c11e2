//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::Utc;
use http::StatusCode;
use http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{APP_CONFIG, JWT_EXPIRY_SECONDS};
use crate::entities::sea_orm_active_enums::RoleEnum;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: String,
    pub role: RoleEnum,
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(user_id: Uuid, role: RoleEnum) -> Self {
        Self {
            user_id: user_id.to_string(),
            role,
            exp: Utc::now().timestamp() + JWT_EXPIRY_SECONDS,
        }
    }
}

pub fn encode_token(claims: &TokenClaims, secret: &str) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(token: &str, secret: &str) -> anyhow::Result<TokenClaims> {
    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Extracts and validates the caller's claims from the Authorization
/// header. Handlers take `AuthClaims(claims)` and do their own role
/// checks; a missing or bad token rejects with 401 before the handler
/// runs.
pub struct AuthClaims(pub TokenClaims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    (
                        StatusCode::UNAUTHORIZED,
                        "Missing bearer token".to_string(),
                    )
                })?;

        let claims = decode_token(bearer.token(), &APP_CONFIG.jwt_secret)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string()))?;

        Ok(AuthClaims(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let user_id = Uuid::new_v4();
        let claims = TokenClaims::new(user_id, RoleEnum::Student);
        let token = encode_token(&claims, "test-secret").unwrap();

        let decoded = decode_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.user_id, user_id.to_string());
        assert_eq!(decoded.role, RoleEnum::Student);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = TokenClaims::new(Uuid::new_v4(), RoleEnum::Admin);
        let token = encode_token(&claims, "test-secret").unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = TokenClaims {
            user_id: Uuid::new_v4().to_string(),
            role: RoleEnum::Student,
            exp: Utc::now().timestamp() - 120,
        };
        let token = encode_token(&claims, "test-secret").unwrap();
        assert!(decode_token(&token, "test-secret").is_err());
    }
}
