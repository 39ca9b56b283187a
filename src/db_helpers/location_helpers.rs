use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::{LocationRequest, UpdateLocationRequest},
    errors::RequestError,
    models::Location,
};

use super::{now, QueryBuilder};

const LOCATION_COLUMNS: &str = "id, name, is_published, created_at";

pub async fn get_location_in_db(pool: &SqlitePool, id: i64) -> Result<Location, RequestError> {
    let query = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1");
    let location = sqlx::query_as::<Sqlite, Location>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    location.ok_or(RequestError::NotFound)
}

pub async fn list_locations_in_db(pool: &SqlitePool) -> Result<Vec<Location>, RequestError> {
    let query = format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY name");
    let locations = sqlx::query_as::<Sqlite, Location>(&query)
        .fetch_all(pool)
        .await?;
    Ok(locations)
}

pub async fn insert_location_in_db(
    pool: &SqlitePool,
    LocationRequest { name, is_published }: LocationRequest,
) -> Result<Location, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO locations (name, is_published, created_at)
        VALUES ($1, $2, $3)
        RETURNING {LOCATION_COLUMNS}
        "#
    );
    let location = sqlx::query_as::<Sqlite, Location>(&query)
        .bind(name)
        .bind(is_published)
        .bind(now())
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(location)
}

pub async fn update_location_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateLocationRequest { name, is_published }: UpdateLocationRequest,
) -> Result<Location, RequestError> {
    if name.is_some() || is_published.is_some() {
        let mut tx = pool.begin().await?;
        let mut builder = QueryBuilder::new("UPDATE locations SET ");
        let mut set = builder.separated(", ");
        if let Some(name) = name {
            set.push("name = ");
            set.push_bind_unseparated(name);
        }
        if let Some(is_published) = is_published {
            set.push("is_published = ");
            set.push_bind_unseparated(is_published);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.build().execute(&mut tx).await?;
        tx.commit().await?;
    }
    get_location_in_db(pool, id).await
}

/// Posts at the location survive with their location cleared.
pub async fn delete_location_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM locations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    Ok(())
}
