use serde::{Deserialize, Serialize};

use super::response::{
    AdminCategoryResponse, CategoryResponse, CommentResponse, PostResponse, ProfileResponse,
};

pub const EMPTY_VALUE_DISPLAY: &str = "Не задано";

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfileWrapper {
    pub profile: ProfileResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentWrapper<T> {
    pub comment: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostWrapper<T> {
    pub post: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostDetailWrapper {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// One page of a post listing.
#[derive(Debug, Deserialize, Serialize)]
pub struct PostPageWrapper {
    pub posts: Vec<PostResponse>,
    #[serde(rename = "postsCount")]
    pub posts_count: i64,
    pub page: i64,
    #[serde(rename = "numPages")]
    pub num_pages: i64,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
    #[serde(rename = "hasPrevious")]
    pub has_previous: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryPageWrapper {
    pub category: CategoryResponse,
    #[serde(flatten)]
    pub page: PostPageWrapper,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfilePageWrapper {
    pub profile: ProfileResponse,
    #[serde(flatten)]
    pub page: PostPageWrapper,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AdminListWrapper<T> {
    pub items: Vec<T>,
    pub count: usize,
    #[serde(rename = "emptyValueDisplay")]
    pub empty_value_display: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AdminCategoryDetailWrapper {
    pub category: AdminCategoryResponse,
    pub posts: Vec<PostResponse>,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}

impl<T> AdminListWrapper<T> {
    pub fn new(items: Vec<T>) -> Self {
        AdminListWrapper {
            count: items.len(),
            items,
            empty_value_display: EMPTY_VALUE_DISPLAY.to_string(),
        }
    }
}
