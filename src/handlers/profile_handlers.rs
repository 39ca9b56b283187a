use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::{AuthUser, MaybeUser},
    config::Config,
    data_formats::{
        PageQueryParams, ProfilePageWrapper, ProfileResponse, ProfileWrapper,
        UpdateProfileRequest, UserWrapper,
    },
    db_helpers::{get_profile_by_username_in_db, update_profile_in_db, PostFilter},
    errors::RequestError,
};

use super::{post_handlers::post_page, JsonResult};

/// The owner sees every post of theirs; other readers only the visible ones.
pub async fn get_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    maybe_user: MaybeUser,
    Path(username): Path<String>,
    Query(params): Query<PageQueryParams>,
) -> JsonResult<ProfilePageWrapper> {
    let profile = get_profile_by_username_in_db(&pool, &username).await?;
    let filter = if maybe_user.get_id() == Some(profile.id) {
        PostFilter::all().by_author(profile.id)
    } else {
        PostFilter::visible().by_author(profile.id)
    };
    let page = post_page(&pool, &filter, &params, config.posts_per_page).await?;
    Ok(Json(ProfilePageWrapper {
        profile: ProfileResponse::new(profile),
        page,
    }))
}

pub async fn edit_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, .. }: AuthUser,
    Json(UserWrapper { user }): Json<UserWrapper<UpdateProfileRequest>>,
) -> JsonResult<ProfileWrapper> {
    user.validate()?;
    let profile = update_profile_in_db(&pool, id, user).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::RunTimeError("Username or email already exists");
        }
        e
    })?;
    tracing::info!(user_id = id, "profile updated");
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(profile),
    }))
}
