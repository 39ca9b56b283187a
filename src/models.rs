use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// A post joined with its author, category and location, as every listing reads it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub author_id: i64,
    pub author_username: String,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub location_is_published: Option<bool>,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
}

impl Post {
    /// Published, not scheduled for later, and not filed under an unpublished category.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published
            && self.pub_date <= now
            && self.category_is_published.unwrap_or(true)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn post(is_published: bool, offset: Duration, category: Option<bool>) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            title: "t".into(),
            text: "x".into(),
            pub_date: now + offset,
            image: None,
            author_id: 1,
            author_username: "a".into(),
            location_id: None,
            location_name: None,
            location_is_published: None,
            category_id: category.map(|_| 1),
            category_title: category.map(|_| "c".into()),
            category_slug: category.map(|_| "c".into()),
            category_is_published: category,
            is_published,
            created_at: now,
            comment_count: 0,
        }
    }

    #[test]
    fn visibility_requires_every_clause() {
        let now = Utc::now() + Duration::seconds(1);
        assert!(post(true, Duration::zero(), Some(true)).is_visible_at(now));
        assert!(post(true, Duration::zero(), None).is_visible_at(now));
        assert!(!post(false, Duration::zero(), Some(true)).is_visible_at(now));
        assert!(!post(true, Duration::days(1), Some(true)).is_visible_at(now));
        assert!(!post(true, Duration::zero(), Some(false)).is_visible_at(now));
    }
}
