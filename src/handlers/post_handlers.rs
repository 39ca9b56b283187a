use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::{AuthUser, MaybeUser},
    config::Config,
    data_formats::{
        CategoryPageWrapper, CategoryResponse, CommentResponse, ImageUpload, PageQueryParams,
        PostDetailWrapper, PostPageWrapper, PostResponse, PostWrapper,
    },
    db_helpers::{
        check_post_relations_in_db, count_posts_in_db, create_post_in_db, delete_post_in_db,
        get_comments_for_post_in_db, get_post_in_db, get_published_category_by_slug_in_db,
        list_posts_in_db, now, update_post_in_db, PostFilter,
    },
    errors::RequestError,
    media::{read_post_form, remove_image, save_image, validate_image},
    pagination::Page,
};

use super::{ensure_author, CreatedResult, JsonResult};

type PostJson = PostWrapper<PostResponse>;

/// Counts the filtered posts, resolves the requested page and loads it.
pub(crate) async fn post_page(
    pool: &SqlitePool,
    filter: &PostFilter,
    params: &PageQueryParams,
    page_size: i64,
) -> Result<PostPageWrapper, RequestError> {
    let count = count_posts_in_db(pool, filter).await?;
    let page = Page::resolve(params.page.as_deref(), count, page_size)?;
    let posts = list_posts_in_db(pool, filter, &page)
        .await?
        .into_iter()
        .map(PostResponse::new)
        .collect();
    Ok(page.wrap(posts))
}

pub async fn index(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Query(params): Query<PageQueryParams>,
) -> JsonResult<PostPageWrapper> {
    let page = post_page(&pool, &PostFilter::visible(), &params, config.posts_per_page).await?;
    Ok(Json(page))
}

pub async fn category_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Path(category_slug): Path<String>,
    Query(params): Query<PageQueryParams>,
) -> JsonResult<CategoryPageWrapper> {
    let category = get_published_category_by_slug_in_db(&pool, &category_slug).await?;
    let filter = PostFilter::visible().in_category(category.id);
    let page = post_page(&pool, &filter, &params, config.posts_per_page).await?;
    Ok(Json(CategoryPageWrapper {
        category: CategoryResponse::new(category),
        page,
    }))
}

/// Hidden posts are a 404 for everyone but their author.
pub async fn post_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(post_id): Path<i64>,
) -> JsonResult<PostDetailWrapper> {
    let post = get_post_in_db(&pool, post_id).await?;
    let is_author = maybe_user.get_id() == Some(post.author_id);
    if !is_author && !post.is_visible_at(now()) {
        return Err(RequestError::NotFound);
    }
    let comments = get_comments_for_post_in_db(&pool, post_id)
        .await?
        .into_iter()
        .map(CommentResponse::new)
        .collect();
    Ok(Json(PostDetailWrapper {
        post: PostResponse::new(post),
        comments,
    }))
}

pub async fn create_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    AuthUser { id, .. }: AuthUser,
    multipart: Multipart,
) -> CreatedResult<PostJson> {
    let mut new_post = read_post_form(multipart).await?.into_new_post()?;
    if let Some(image) = &new_post.image {
        validate_image(image)?;
    }
    check_post_relations_in_db(&pool, Some(new_post.category_id), new_post.location_id).await?;

    let image = match new_post.image.take() {
        Some(upload) => Some(store_image(&config, &upload).await?),
        None => None,
    };
    let post = match create_post_in_db(&pool, id, new_post, image.clone()).await {
        Ok(post) => post,
        Err(e) => {
            discard_image(&config, image.as_deref()).await;
            return Err(e);
        }
    };
    tracing::info!(post_id = post.id, author_id = id, "post created");
    Ok((
        StatusCode::CREATED,
        Json(PostWrapper {
            post: PostResponse::new(post),
        }),
    ))
}

/// Anyone but the author is sent back to the post.
pub async fn edit_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    maybe_user: MaybeUser,
    Path(post_id): Path<i64>,
    multipart: Multipart,
) -> JsonResult<PostJson> {
    let existing = get_post_in_db(&pool, post_id).await?;
    if maybe_user.get_id() != Some(existing.author_id) {
        return Err(RequestError::redirect_to_post(post_id));
    }

    let mut changes = read_post_form(multipart).await?.into_changes()?;
    if let Some(image) = &changes.image {
        validate_image(image)?;
    }
    check_post_relations_in_db(&pool, changes.category_id, changes.location_id.flatten()).await?;

    let image = match changes.image.take() {
        Some(upload) => Some(store_image(&config, &upload).await?),
        None => None,
    };
    let replaced_image = image.as_ref().and(existing.image);
    let post = match update_post_in_db(&pool, post_id, changes, image.clone()).await {
        Ok(post) => post,
        Err(e) => {
            discard_image(&config, image.as_deref()).await;
            return Err(e);
        }
    };
    if let Some(old) = replaced_image {
        remove_image(&config.media_root, &old).await;
    }
    tracing::info!(post_id, "post updated");
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

pub async fn delete_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    AuthUser { id, .. }: AuthUser,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let post = get_post_in_db(&pool, post_id).await?;
    ensure_author(post.author_id, id)?;
    delete_post_in_db(&pool, post_id).await?;
    if let Some(image) = &post.image {
        remove_image(&config.media_root, image).await;
    }
    tracing::info!(post_id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn store_image(config: &Config, upload: &ImageUpload) -> Result<String, RequestError> {
    save_image(&config.media_root, upload).await.map_err(|e| {
        tracing::error!(error = %e, "could not store post image");
        RequestError::ServerError
    })
}

/// Drops a freshly stored image that no post ended up referencing.
async fn discard_image(config: &Config, image: Option<&str>) {
    if let Some(image) = image {
        remove_image(&config.media_root, image).await;
    }
}
