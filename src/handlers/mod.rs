use axum::{
    http::{StatusCode, Uri},
    Json,
};

use crate::errors::RequestError;

mod admin_handlers;
mod comment_handlers;
mod post_handlers;
mod profile_handlers;
mod user_handlers;

pub use admin_handlers::*;
pub use comment_handlers::*;
pub use post_handlers::*;
pub use profile_handlers::*;
pub use user_handlers::*;

type JsonResult<T> = Result<Json<T>, RequestError>;
type CreatedResult<T> = Result<(StatusCode, Json<T>), RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

/// Edit and delete belong to the author alone.
fn ensure_author(author_id: i64, user_id: i64) -> Result<(), RequestError> {
    if author_id == user_id {
        Ok(())
    } else {
        Err(RequestError::Forbidden)
    }
}
