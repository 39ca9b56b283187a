//! Staff-only tabular CRUD over every entity.

use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::StaffUser,
    config::Config,
    data_formats::{
        AdminCategoryDetailWrapper, AdminCategoryResponse, AdminCommentResponse,
        AdminCommentUpdateRequest, AdminListWrapper, AdminLocationResponse, AdminPostQueryParams,
        AdminPostResponse, AdminPostUpdateRequest, CategoryRequest, LocationRequest, PostResponse,
        UpdateCategoryRequest, UpdateLocationRequest,
    },
    db_helpers::{
        admin_list_posts_in_db, admin_update_post_in_db, check_post_relations_in_db,
        delete_category_in_db, delete_comment_in_db, delete_location_in_db, delete_post_in_db,
        get_category_in_db, get_post_in_db, insert_category_in_db, insert_location_in_db, list_categories_in_db,
        list_comments_in_db, list_locations_in_db, set_comment_published_in_db,
        update_category_in_db, update_location_in_db, PostFilter,
    },
    errors::RequestError,
    media::remove_image,
};

use super::{CreatedResult, JsonResult};

fn slug_taken(e: RequestError) -> RequestError {
    if e.is_unique_violation() {
        return RequestError::RunTimeError("Category with this slug already exists");
    }
    e
}

// ----------------- Categories -----------------
pub async fn admin_list_categories(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
) -> JsonResult<AdminListWrapper<AdminCategoryResponse>> {
    let categories = list_categories_in_db(&pool)
        .await?
        .into_iter()
        .map(AdminCategoryResponse::from)
        .collect();
    Ok(Json(AdminListWrapper::new(categories)))
}

/// The category with its posts listed inline.
pub async fn admin_get_category(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Path(id): Path<i64>,
) -> JsonResult<AdminCategoryDetailWrapper> {
    let category = get_category_in_db(&pool, id).await?;
    let filter = PostFilter::all().in_category(id);
    let posts = admin_list_posts_in_db(&pool, &filter)
        .await?
        .into_iter()
        .map(PostResponse::new)
        .collect();
    Ok(Json(AdminCategoryDetailWrapper {
        category: category.into(),
        posts,
    }))
}

pub async fn admin_create_category(
    Extension(pool): Extension<Arc<SqlitePool>>,
    StaffUser(staff): StaffUser,
    Json(request): Json<CategoryRequest>,
) -> CreatedResult<AdminCategoryResponse> {
    request.validate()?;
    let category = insert_category_in_db(&pool, request)
        .await
        .map_err(slug_taken)?;
    tracing::info!(category_id = category.id, staff = %staff.username, "category created");
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn admin_update_category(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCategoryRequest>,
) -> JsonResult<AdminCategoryResponse> {
    request.validate()?;
    let category = update_category_in_db(&pool, id, request)
        .await
        .map_err(slug_taken)?;
    Ok(Json(category.into()))
}

pub async fn admin_delete_category(
    Extension(pool): Extension<Arc<SqlitePool>>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    delete_category_in_db(&pool, id).await?;
    tracing::info!(category_id = id, staff = %staff.username, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Locations -----------------
pub async fn admin_list_locations(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
) -> JsonResult<AdminListWrapper<AdminLocationResponse>> {
    let locations = list_locations_in_db(&pool)
        .await?
        .into_iter()
        .map(AdminLocationResponse::from)
        .collect();
    Ok(Json(AdminListWrapper::new(locations)))
}

pub async fn admin_create_location(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Json(request): Json<LocationRequest>,
) -> CreatedResult<AdminLocationResponse> {
    request.validate()?;
    let location = insert_location_in_db(&pool, request).await?;
    Ok((StatusCode::CREATED, Json(location.into())))
}

pub async fn admin_update_location(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLocationRequest>,
) -> JsonResult<AdminLocationResponse> {
    request.validate()?;
    let location = update_location_in_db(&pool, id, request).await?;
    Ok(Json(location.into()))
}

pub async fn admin_delete_location(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    delete_location_in_db(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Posts -----------------
pub async fn admin_list_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Query(AdminPostQueryParams {
        search,
        is_published,
    }): Query<AdminPostQueryParams>,
) -> JsonResult<AdminListWrapper<AdminPostResponse>> {
    let filter = PostFilter {
        title_contains: search.filter(|s| !s.is_empty()),
        is_published,
        ..PostFilter::all()
    };
    let posts = admin_list_posts_in_db(&pool, &filter)
        .await?
        .into_iter()
        .map(AdminPostResponse::from)
        .collect();
    Ok(Json(AdminListWrapper::new(posts)))
}

pub async fn admin_update_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Path(id): Path<i64>,
    Json(request): Json<AdminPostUpdateRequest>,
) -> JsonResult<AdminPostResponse> {
    check_post_relations_in_db(&pool, request.category, None).await?;
    let post = admin_update_post_in_db(&pool, id, request).await?;
    Ok(Json(post.into()))
}

pub async fn admin_delete_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let post = get_post_in_db(&pool, id).await?;
    delete_post_in_db(&pool, id).await?;
    if let Some(image) = &post.image {
        remove_image(&config.media_root, image).await;
    }
    tracing::info!(post_id = id, staff = %staff.username, "post deleted from admin");
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Comments -----------------
pub async fn admin_list_comments(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
) -> JsonResult<AdminListWrapper<AdminCommentResponse>> {
    let comments = list_comments_in_db(&pool)
        .await?
        .into_iter()
        .map(AdminCommentResponse::from)
        .collect();
    Ok(Json(AdminListWrapper::new(comments)))
}

pub async fn admin_update_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Path(id): Path<i64>,
    Json(AdminCommentUpdateRequest { is_published }): Json<AdminCommentUpdateRequest>,
) -> JsonResult<AdminCommentResponse> {
    let comment = set_comment_published_in_db(&pool, id, is_published).await?;
    Ok(Json(comment.into()))
}

pub async fn admin_delete_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _: StaffUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    delete_comment_in_db(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
