use chrono::{DateTime, Utc};
use sqlx::{FromRow, Row, SqlitePool};

use crate::data_formats::{AdminPostUpdateRequest, NewPost, PostChanges};
use crate::errors::RequestError;
use crate::models::Post;
use crate::pagination::Page;

use super::{now, QueryBuilder};

const POST_COLUMNS: &str = r#"
            SELECT posts.id                                  AS "id",
                   posts.title                               AS "title",
                   posts.text                                AS "text",
                   posts.pub_date                            AS "pub_date",
                   posts.image                               AS "image",
                   posts.author_id                           AS "author_id",
                   users.username                            AS "author_username",
                   posts.location_id                         AS "location_id",
                   locations.name                            AS "location_name",
                   locations.is_published                    AS "location_is_published",
                   posts.category_id                         AS "category_id",
                   categories.title                          AS "category_title",
                   categories.slug                           AS "category_slug",
                   categories.is_published                   AS "category_is_published",
                   posts.is_published                        AS "is_published",
                   posts.created_at                          AS "created_at",
                   (SELECT Count(comments.id)
                    FROM   comments
                    WHERE  comments.post_id = posts.id)      AS "comment_count"
"#;

const POST_FROM: &str = r#"
            FROM   posts
                JOIN users
                    ON posts.author_id = users.id
                LEFT JOIN categories
                    ON posts.category_id = categories.id
                LEFT JOIN locations
                    ON posts.location_id = locations.id
            WHERE  1 = 1
"#;

/// Filters composed onto a post listing.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    /// Only posts visible to readers at this instant.
    pub visible_at: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
    pub title_contains: Option<String>,
    pub is_published: Option<bool>,
}

/// Makes `%`, `_` and `\` match literally in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl PostFilter {
    /// Every post readers may see right now.
    pub fn visible() -> Self {
        PostFilter {
            visible_at: Some(now()),
            ..Default::default()
        }
    }

    pub fn all() -> Self {
        PostFilter::default()
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    fn push_conditions(&self, builder: &mut QueryBuilder<'_>) {
        if let Some(now) = self.visible_at {
            builder
                .push(" AND posts.is_published = 1 AND posts.pub_date <= ")
                .push_bind(now)
                .push(" AND (categories.id IS NULL OR categories.is_published = 1)");
        }
        if let Some(category_id) = self.category_id {
            builder.push(" AND posts.category_id = ").push_bind(category_id);
        }
        if let Some(author_id) = self.author_id {
            builder.push(" AND posts.author_id = ").push_bind(author_id);
        }
        if let Some(search) = &self.title_contains {
            builder
                .push(" AND posts.title LIKE ")
                .push_bind(format!("%{}%", escape_like(search)))
                .push(r" ESCAPE '\'");
        }
        if let Some(is_published) = self.is_published {
            builder.push(" AND posts.is_published = ").push_bind(is_published);
        }
    }
}

pub async fn count_posts_in_db(pool: &SqlitePool, filter: &PostFilter) -> Result<i64, RequestError> {
    let mut builder = QueryBuilder::new("SELECT Count(posts.id) AS \"count\"");
    builder.push(POST_FROM);
    filter.push_conditions(&mut builder);
    let row = builder.build().fetch_one(pool).await?;
    Ok(row.try_get("count")?)
}

/// Newest publication date first, one page at a time.
pub async fn list_posts_in_db(
    pool: &SqlitePool,
    filter: &PostFilter,
    page: &Page,
) -> Result<Vec<Post>, RequestError> {
    let mut builder = QueryBuilder::new(POST_COLUMNS);
    builder.push(POST_FROM);
    filter.push_conditions(&mut builder);
    builder
        .push(" ORDER BY posts.pub_date DESC, posts.id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = builder.build().fetch_all(pool).await?;
    let posts = rows
        .iter()
        .map(Post::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

/// Admin listing, oldest publication date first and unpaginated.
pub async fn admin_list_posts_in_db(
    pool: &SqlitePool,
    filter: &PostFilter,
) -> Result<Vec<Post>, RequestError> {
    let mut builder = QueryBuilder::new(POST_COLUMNS);
    builder.push(POST_FROM);
    filter.push_conditions(&mut builder);
    builder.push(" ORDER BY posts.pub_date, posts.id");
    let rows = builder.build().fetch_all(pool).await?;
    let posts = rows
        .iter()
        .map(Post::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

/// Fetches a post regardless of its visibility.
pub async fn get_post_in_db(pool: &SqlitePool, id: i64) -> Result<Post, RequestError> {
    let mut builder = QueryBuilder::new(POST_COLUMNS);
    builder.push(POST_FROM);
    builder.push(" AND posts.id = ").push_bind(id);
    let row = builder.build().fetch_optional(pool).await?;
    match row {
        Some(row) => Ok(Post::from_row(&row)?),
        None => Err(RequestError::NotFound),
    }
}

/// Rejects references to categories or locations that do not exist.
pub async fn check_post_relations_in_db(
    pool: &SqlitePool,
    category_id: Option<i64>,
    location_id: Option<i64>,
) -> Result<(), RequestError> {
    let mut errors = Vec::new();
    if let Some(id) = category_id {
        let found = sqlx::query("SELECT id FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if found.is_none() {
            errors.push("category: select a valid choice".to_string());
        }
    }
    if let Some(id) = location_id {
        let found = sqlx::query("SELECT id FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if found.is_none() {
            errors.push("location: select a valid choice".to_string());
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RequestError::Unprocessable(errors))
    }
}

pub async fn create_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    NewPost {
        title,
        text,
        pub_date,
        category_id,
        location_id,
        is_published,
        ..
    }: NewPost,
    image: Option<String>,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query(
        r#"
        INSERT INTO posts (title, text, pub_date, image, author_id, location_id, category_id, is_published, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(text)
    .bind(pub_date)
    .bind(image)
    .bind(author_id)
    .bind(location_id)
    .bind(category_id)
    .bind(is_published)
    .bind(now())
    .fetch_one(&mut tx)
    .await?;
    let id: i64 = row.try_get("id")?;
    tx.commit().await?;

    get_post_in_db(pool, id).await
}

/// Applies the changed fields; `image` replaces the stored image path when set.
pub async fn update_post_in_db(
    pool: &SqlitePool,
    id: i64,
    PostChanges {
        title,
        text,
        pub_date,
        category_id,
        location_id,
        is_published,
        ..
    }: PostChanges,
    image: Option<String>,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let mut builder = QueryBuilder::new("UPDATE posts SET ");
    let mut set = builder.separated(", ");
    let mut changed = false;
    for (column, value) in [("title", title), ("text", text), ("image", image)] {
        if let Some(value) = value {
            set.push(format!("{} = ", column));
            set.push_bind_unseparated(value);
            changed = true;
        }
    }
    if let Some(pub_date) = pub_date {
        set.push("pub_date = ");
        set.push_bind_unseparated(pub_date);
        changed = true;
    }
    for (column, value) in [("category_id", category_id.map(Some)), ("location_id", location_id)] {
        if let Some(value) = value {
            set.push(format!("{} = ", column));
            set.push_bind_unseparated(value);
            changed = true;
        }
    }
    if let Some(is_published) = is_published {
        set.push("is_published = ");
        set.push_bind_unseparated(is_published);
        changed = true;
    }
    if changed {
        builder.push(" WHERE id = ").push_bind(id);
        builder.build().execute(&mut tx).await?;
    }
    tx.commit().await?;

    get_post_in_db(pool, id).await
}

/// Only the columns the admin listing exposes as editable.
pub async fn admin_update_post_in_db(
    pool: &SqlitePool,
    id: i64,
    AdminPostUpdateRequest {
        category,
        is_published,
    }: AdminPostUpdateRequest,
) -> Result<Post, RequestError> {
    let changes = PostChanges {
        category_id: category,
        is_published,
        ..Default::default()
    };
    update_post_in_db(pool, id, changes, None).await
}

/// Comments go with the post.
pub async fn delete_post_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    Ok(())
}
