use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::RegisterRequest, errors::RequestError, models::User};

use super::{now, USER_COLUMNS};

/// Inserts a user; `user.password` must already be hashed.
pub async fn insert_user(pool: &SqlitePool, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO users (email, username, password, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password)
        .bind(now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

/// Grants or revokes access to the admin screens.
pub async fn set_staff_in_db(
    pool: &SqlitePool,
    username: &str,
    is_staff: bool,
) -> Result<(), RequestError> {
    let result = sqlx::query("UPDATE users SET is_staff = $1 WHERE username = $2")
        .bind(is_staff)
        .bind(username)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    Ok(())
}
