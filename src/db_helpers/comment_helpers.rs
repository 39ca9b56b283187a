use sqlx::{Row, Sqlite, SqlitePool};

use crate::{data_formats::CommentRequest, errors::RequestError, models::Comment};

use super::now;

const COMMENT_QUERY: &str = r#"
            SELECT comments.id           AS "id",
                   comments.text         AS "text",
                   comments.post_id      AS "post_id",
                   comments.author_id    AS "author_id",
                   users.username        AS "author_username",
                   comments.is_published AS "is_published",
                   comments.created_at   AS "created_at"
            FROM   comments
                JOIN users
                    ON comments.author_id = users.id
"#;

pub async fn add_comment_to_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    post_id: i64,
    CommentRequest { text }: CommentRequest,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;

    let post = sqlx::query("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&mut tx)
        .await?;
    if post.is_none() {
        return Err(RequestError::NotFound);
    }

    let row = sqlx::query(
        r#"
        INSERT INTO comments (text, post_id, author_id, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(post_id)
    .bind(author_id)
    .bind(now())
    .fetch_one(&mut tx)
    .await?;
    let id: i64 = row.try_get("id")?;
    tx.commit().await?;

    get_comment_in_db(pool, id).await
}

pub async fn get_comment_in_db(pool: &SqlitePool, id: i64) -> Result<Comment, RequestError> {
    let query = format!("{COMMENT_QUERY} WHERE comments.id = $1");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    result.ok_or(RequestError::NotFound)
}

/// The comment only counts as found when it belongs to `post_id`.
pub async fn get_comment_for_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
    id: i64,
) -> Result<Comment, RequestError> {
    let query = format!("{COMMENT_QUERY} WHERE comments.post_id = $1 AND comments.id = $2");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(post_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    result.ok_or(RequestError::NotFound)
}

/// Oldest first.
pub async fn get_comments_for_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_QUERY} WHERE comments.post_id = $1 ORDER BY comments.created_at, comments.id"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(post_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn list_comments_in_db(pool: &SqlitePool) -> Result<Vec<Comment>, RequestError> {
    let query = format!("{COMMENT_QUERY} ORDER BY comments.created_at, comments.id");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn update_comment_text_in_db(
    pool: &SqlitePool,
    id: i64,
    CommentRequest { text }: CommentRequest,
) -> Result<Comment, RequestError> {
    sqlx::query("UPDATE comments SET text = $1 WHERE id = $2")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await?;
    get_comment_in_db(pool, id).await
}

pub async fn set_comment_published_in_db(
    pool: &SqlitePool,
    id: i64,
    is_published: bool,
) -> Result<Comment, RequestError> {
    sqlx::query("UPDATE comments SET is_published = $1 WHERE id = $2")
        .bind(is_published)
        .bind(id)
        .execute(pool)
        .await?;
    get_comment_in_db(pool, id).await
}

pub async fn delete_comment_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    Ok(())
}
