use std::sync::Arc;

use crate::config::Config;
use crate::db_helpers::get_user_by_id;
use crate::errors::RequestError;
use crate::models::User;
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

const JWT_EXPIRY_DURATION: time::Duration = time::Duration::days(90);

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub token: String,
}

pub struct MaybeUser(pub Option<AuthUser>);

/// A logged in staff member, loaded from the database.
pub struct StaffUser(pub User);

impl MaybeUser {
    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|a| a.id)
    }
}

fn config_from_parts(parts: &Parts) -> Result<Arc<Config>, RequestError> {
    parts
        .extensions
        .get::<Arc<Config>>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("Config extension missing from router");
            RequestError::ServerError
        })
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = match parts.headers.get("Authorization") {
            Some(header) => header,
            None => return Ok(MaybeUser(None)),
        };
        let header = match header.to_str() {
            Ok(header) => header,
            Err(_) => {
                tracing::debug!("Authorization header is not valid ASCII");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let token = match header.strip_prefix("Token ") {
            Some(token) => token,
            None => {
                tracing::debug!("Authorization header without Token prefix");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let config = config_from_parts(parts)?;
        let id = verify_jwt_token(token, &config.jwt_secret)?;

        Ok(MaybeUser(Some(AuthUser {
            id,
            token: token.to_string(),
        })))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(user),
            MaybeUser(None) => Err(RequestError::NotAuthorized("Need to be authorized")),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser { id, .. } = AuthUser::from_request_parts(parts, state).await?;
        let pool = parts
            .extensions
            .get::<Arc<SqlitePool>>()
            .cloned()
            .ok_or(RequestError::ServerError)?;
        match get_user_by_id(&pool, id).await? {
            Some(user) if user.is_staff => Ok(StaffUser(user)),
            Some(_) => Err(RequestError::Forbidden),
            None => Err(RequestError::NotAuthorized("User no longer exists")),
        }
    }
}

pub fn get_jwt_token(id: i64, jwt_secret: &str) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + JWT_EXPIRY_DURATION;
    let claim = AuthClaim {
        id,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(token: &str, jwt_secret: &str) -> Result<i64, RequestError> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Error verifying token");
        RequestError::NotAuthorized("Invalid Token")
    })?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok(claim.id)
}

pub async fn verify_password_argon2(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to verify password"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_user_id() {
        let token = get_jwt_token(42, "secret").unwrap();
        assert_eq!(verify_jwt_token(&token, "secret").unwrap(), 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = get_jwt_token(42, "secret").unwrap();
        assert!(matches!(
            verify_jwt_token(&token, "other"),
            Err(RequestError::NotAuthorized(_))
        ));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hash = hash_password_argon2("hunter22".to_string()).await.unwrap();
        assert!(verify_password_argon2("hunter22".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_argon2("wrong".to_string(), hash)
            .await
            .unwrap());
    }
}
