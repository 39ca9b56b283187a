use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use sqlx::SqlitePool;

use crate::{
    authentication::AuthUser,
    data_formats::{CommentRequest, CommentResponse, CommentWrapper},
    db_helpers::{
        add_comment_to_post_in_db, delete_comment_in_db, get_comment_for_post_in_db,
        update_comment_text_in_db,
    },
    errors::RequestError,
};

use super::{ensure_author, CreatedResult, JsonResult};

type CommentJson = CommentWrapper<CommentResponse>;

pub async fn add_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, .. }: AuthUser,
    Path(post_id): Path<i64>,
    Json(CommentWrapper { comment }): Json<CommentWrapper<CommentRequest>>,
) -> CreatedResult<CommentJson> {
    comment.validate()?;
    let comment = add_comment_to_post_in_db(&pool, id, post_id, comment).await?;
    tracing::info!(post_id, comment_id = comment.id, "comment added");
    Ok((
        StatusCode::CREATED,
        Json(CommentWrapper {
            comment: CommentResponse::new(comment),
        }),
    ))
}

pub async fn edit_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, .. }: AuthUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(CommentWrapper { comment }): Json<CommentWrapper<CommentRequest>>,
) -> JsonResult<CommentJson> {
    let existing = get_comment_for_post_in_db(&pool, post_id, comment_id).await?;
    ensure_author(existing.author_id, id)?;
    comment.validate()?;
    let comment = update_comment_text_in_db(&pool, comment_id, comment).await?;
    Ok(Json(CommentWrapper {
        comment: CommentResponse::new(comment),
    }))
}

pub async fn delete_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, .. }: AuthUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, RequestError> {
    let existing = get_comment_for_post_in_db(&pool, post_id, comment_id).await?;
    ensure_author(existing.author_id, id)?;
    delete_comment_in_db(&pool, comment_id).await?;
    tracing::info!(post_id, comment_id, "comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
