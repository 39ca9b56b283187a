use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::{CategoryRequest, UpdateCategoryRequest},
    errors::RequestError,
    models::Category,
};

use super::{now, QueryBuilder};

const CATEGORY_COLUMNS: &str = "id, title, description, slug, is_published, created_at";

/// A category readers may browse: it must exist and be published.
pub async fn get_published_category_by_slug_in_db(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Category, RequestError> {
    let query = format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1 AND is_published = 1"
    );
    let category = sqlx::query_as::<Sqlite, Category>(&query)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    category.ok_or(RequestError::NotFound)
}

pub async fn get_category_in_db(pool: &SqlitePool, id: i64) -> Result<Category, RequestError> {
    let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
    let category = sqlx::query_as::<Sqlite, Category>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    category.ok_or(RequestError::NotFound)
}

pub async fn list_categories_in_db(pool: &SqlitePool) -> Result<Vec<Category>, RequestError> {
    let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY title");
    let categories = sqlx::query_as::<Sqlite, Category>(&query)
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

pub async fn insert_category_in_db(
    pool: &SqlitePool,
    CategoryRequest {
        title,
        description,
        slug,
        is_published,
    }: CategoryRequest,
) -> Result<Category, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {CATEGORY_COLUMNS}
        "#
    );
    let category = sqlx::query_as::<Sqlite, Category>(&query)
        .bind(title)
        .bind(description)
        .bind(slug)
        .bind(is_published)
        .bind(now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(category)
}

pub async fn update_category_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateCategoryRequest {
        title,
        description,
        slug,
        is_published,
    }: UpdateCategoryRequest,
) -> Result<Category, RequestError> {
    let mut tx = pool.begin().await?;
    let mut builder = QueryBuilder::new("UPDATE categories SET ");
    let mut set = builder.separated(", ");
    let mut changed = false;
    for (column, value) in [("title", title), ("description", description), ("slug", slug)] {
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
    get_category_in_db(pool, id).await
}

/// Posts of the category survive with their category cleared.
pub async fn delete_category_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    Ok(())
}
