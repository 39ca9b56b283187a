use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use sqlx::SqlitePool;

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser,
    },
    config::Config,
    data_formats::{LoginRequest, RegisterRequest, UserResponse, UserWrapper},
    db_helpers::{get_user_by_email, get_user_by_id, insert_user},
    errors::RequestError,
};

use super::{CreatedResult, JsonResult};

type UserJson = UserWrapper<UserResponse>;

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> JsonResult<UserJson> {
    let user = match get_user_by_email(&pool, &request.email).await? {
        Some(user) => user,
        None => return Err(RequestError::RunTimeError("Email not found")),
    };
    let is_password_correct = verify_password_argon2(request.password, user.password.clone())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification failed");
            RequestError::RunTimeError("Could not login user\nPlease Try again")
        })?;

    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password"));
    }
    let token = get_jwt_token(user.id, &config.jwt_secret).map_err(|e| {
        tracing::error!(error = %e, "could not issue token");
        RequestError::ServerError
    })?;
    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { mut user }): Json<UserWrapper<RegisterRequest>>,
) -> CreatedResult<UserJson> {
    user.validate()?;
    user.password = hash_password_argon2(user.password).await.map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        RequestError::RunTimeError("Could not register user\nPlease Try again")
    })?;

    let user = insert_user(&pool, &user).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::RunTimeError("Username or email already exists");
        }
        e
    })?;

    let token = get_jwt_token(user.id, &config.jwt_secret).map_err(|e| {
        tracing::error!(error = %e, "could not issue token");
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
    })?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserWrapper::wrap_with_user_data(UserResponse::new(
            user, token,
        ))),
    ))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, token }: AuthUser,
) -> JsonResult<UserJson> {
    match get_user_by_id(&pool, id).await? {
        Some(user) => Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
            user, token,
        )))),
        None => Err(RequestError::RunTimeError("User not found")),
    }
}
