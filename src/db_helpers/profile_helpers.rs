use sqlx::SqlitePool;

use crate::{data_formats::UpdateProfileRequest, errors::RequestError, models::User};

use super::{get_user_by_id, get_user_by_username, QueryBuilder};

pub async fn get_profile_by_username_in_db(
    pool: &SqlitePool,
    username: &str,
) -> Result<User, RequestError> {
    match get_user_by_username(pool, username).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound),
    }
}

pub async fn update_profile_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateProfileRequest {
        first_name,
        last_name,
        username,
        email,
    }: UpdateProfileRequest,
) -> Result<User, RequestError> {
    let fields = [
        ("first_name", first_name),
        ("last_name", last_name),
        ("username", username),
        ("email", email),
    ];
    if fields.iter().any(|(_, value)| value.is_some()) {
        let mut tx = pool.begin().await?;
        let mut builder = QueryBuilder::new("UPDATE users SET ");
        let mut set = builder.separated(", ");
        for (column, value) in fields {
            if let Some(value) = value {
                set.push(format!("{} = ", column));
                set.push_bind_unseparated(value);
            }
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.build().execute(&mut tx).await?;
        tx.commit().await?;
    }

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound),
    }
}
