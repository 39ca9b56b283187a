use serde::{Deserialize, Serialize};

use crate::models::{Category, Comment, Location, Post, User};

pub const MEDIA_URL: &str = "/media/";

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub token: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "isStaff")]
    pub is_staff: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProfileResponse {
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "dateJoined")]
    pub date_joined: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AuthorResponse {
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PostCategoryResponse {
    pub title: String,
    pub slug: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CategoryResponse {
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LocationResponse {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub image: Option<String>,
    pub author: AuthorResponse,
    pub location: Option<LocationResponse>,
    pub category: Option<PostCategoryResponse>,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "commentCount")]
    pub comment_count: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommentResponse {
    pub id: i64,
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub author: AuthorResponse,
}

// ----------------- Admin Response -----------------
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AdminCategoryResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AdminLocationResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AdminPostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub author: String,
    pub location: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AdminCommentResponse {
    pub id: i64,
    pub text: String,
    pub post: i64,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    pub author: String,
}

impl UserResponse {
    pub fn new(
        User {
            username,
            email,
            first_name,
            last_name,
            is_staff,
            ..
        }: User,
        token: String,
    ) -> Self {
        UserResponse {
            email,
            token,
            username,
            first_name,
            last_name,
            is_staff,
        }
    }
}

impl ProfileResponse {
    pub fn new(
        User {
            username,
            first_name,
            last_name,
            created_at,
            ..
        }: User,
    ) -> Self {
        ProfileResponse {
            username,
            first_name,
            last_name,
            date_joined: created_at.to_rfc3339(),
        }
    }
}

impl CategoryResponse {
    pub fn new(
        Category {
            title,
            description,
            slug,
            ..
        }: Category,
    ) -> Self {
        CategoryResponse {
            title,
            description,
            slug,
        }
    }
}

pub fn media_url(path: &str) -> String {
    format!("{}{}", MEDIA_URL, path)
}

impl PostResponse {
    pub fn new(
        Post {
            id,
            title,
            text,
            pub_date,
            image,
            author_username,
            location_name,
            location_is_published,
            category_title,
            category_slug,
            is_published,
            created_at,
            comment_count,
            ..
        }: Post,
    ) -> Self {
        // Hidden locations are not shown to readers.
        let location = match (location_name, location_is_published) {
            (Some(name), Some(true)) => Some(LocationResponse { name }),
            _ => None,
        };
        let category = match (category_title, category_slug) {
            (Some(title), Some(slug)) => Some(PostCategoryResponse { title, slug }),
            _ => None,
        };
        PostResponse {
            id,
            title,
            text,
            pub_date: pub_date.to_rfc3339(),
            image: image.as_deref().map(media_url),
            author: AuthorResponse {
                username: author_username,
            },
            location,
            category,
            is_published,
            created_at: created_at.to_rfc3339(),
            comment_count,
        }
    }
}

impl CommentResponse {
    pub fn new(
        Comment {
            id,
            post_id,
            text,
            created_at,
            author_username,
            ..
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            post_id,
            text,
            created_at: created_at.to_rfc3339(),
            author: AuthorResponse {
                username: author_username,
            },
        }
    }
}

impl From<Category> for AdminCategoryResponse {
    fn from(category: Category) -> Self {
        AdminCategoryResponse {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
            is_published: category.is_published,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

impl From<Location> for AdminLocationResponse {
    fn from(location: Location) -> Self {
        AdminLocationResponse {
            id: location.id,
            name: location.name,
            is_published: location.is_published,
            created_at: location.created_at.to_rfc3339(),
        }
    }
}

impl From<Post> for AdminPostResponse {
    fn from(post: Post) -> Self {
        AdminPostResponse {
            id: post.id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date.to_rfc3339(),
            author: post.author_username,
            location: post.location_name,
            category: post.category_title,
            is_published: post.is_published,
        }
    }
}

impl From<Comment> for AdminCommentResponse {
    fn from(comment: Comment) -> Self {
        AdminCommentResponse {
            id: comment.id,
            text: comment.text,
            post: comment.post_id,
            is_published: comment.is_published,
            author: comment.author_username,
        }
    }
}
