use chrono::{DateTime, TimeZone, Utc};
use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

mod category_helpers;
mod comment_helpers;
mod location_helpers;
mod post_helpers;
mod profile_helpers;
mod user_helpers;

pub use category_helpers::*;
pub use comment_helpers::*;
pub use location_helpers::*;
pub use post_helpers::*;
pub use profile_helpers::*;
pub use user_helpers::*;

type QueryBuilder<'args> = sqlx::QueryBuilder<'args, Sqlite>;

const USER_COLUMNS: &str =
    "id, username, email, password, first_name, last_name, is_staff, created_at";

/// Current time truncated to whole seconds, matching how publication dates are stored.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_opt(now.timestamp(), 0).single().unwrap_or(now)
}

// ----------------- Helper Functions -----------------

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}
