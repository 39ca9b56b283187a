use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::JsonResponse;

#[derive(Debug)]
pub enum RequestError {
    NotFound,
    NotAuthorized(&'static str),
    Forbidden,
    Unprocessable(Vec<String>),
    RunTimeError(&'static str),
    RedirectTo(String),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJsonWrapper {
    pub errors: RequestErrorJson,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJson {
    pub body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        Self::from_messages(vec![error.to_string()])
    }

    pub fn from_messages(body: Vec<String>) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson { body },
        }
    }
}

impl RequestError {
    /// Redirect to the detail page of a post, used when a non-author tries to edit it.
    pub fn redirect_to_post(post_id: i64) -> Self {
        Self::RedirectTo(format!("/posts/{}", post_id))
    }

    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                e.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        if let RequestError::RedirectTo(path) = &self {
            return Redirect::to(path).into_response();
        }
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let (status_code, json) = match self {
            RequestError::NotFound => (
                StatusCode::NOT_FOUND,
                RequestErrorJsonWrapper::new("Not Found"),
            ),
            RequestError::NotAuthorized(message) => (
                StatusCode::UNAUTHORIZED,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::Forbidden => (
                StatusCode::FORBIDDEN,
                RequestErrorJsonWrapper::new("Forbidden"),
            ),
            RequestError::Unprocessable(messages) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJsonWrapper::from_messages(messages.clone()),
            ),
            RequestError::RunTimeError(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::RedirectTo(path) => (
                StatusCode::SEE_OTHER,
                RequestErrorJsonWrapper::new(path),
            ),
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RequestErrorJsonWrapper::new("Internal Server Error"),
            ),
            RequestError::DatabaseError(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJsonWrapper::new("Internal Server Error"),
                )
            }
        };
        (status_code, Json(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_carries_location_header() {
        let response = RequestError::redirect_to_post(7).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/posts/7"
        );
    }

    #[test]
    fn validation_errors_map_to_unprocessable() {
        let (status, Json(body)) = RequestError::Unprocessable(vec![
            "title: must not be empty".to_string(),
            "text: must not be empty".to_string(),
        ])
        .to_json_response();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.errors.body.len(), 2);
    }

    #[test]
    fn not_found_status() {
        let (status, _) = RequestError::NotFound.to_json_response();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
