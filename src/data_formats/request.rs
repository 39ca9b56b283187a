use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

pub const MAX_TITLE_LENGTH: usize = 256;

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut errors = Vec::new();
        check_username(&self.username, &mut errors);
        check_email(&self.email, &mut errors);
        if self.password.len() < 8 {
            errors.push("password: must be at least 8 characters".to_string());
        }
        into_result(errors)
    }
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut errors = Vec::new();
        if let Some(username) = &self.username {
            check_username(username, &mut errors);
        }
        if let Some(email) = &self.email {
            check_email(email, &mut errors);
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.as_ref().map_or(false, |v| v.chars().count() > 150) {
                errors.push(format!("{}: must be at most 150 characters", field));
            }
        }
        into_result(errors)
    }
}

fn check_username(username: &str, errors: &mut Vec<String>) {
    let valid = !username.is_empty()
        && username.chars().count() <= 150
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c));
    if !valid {
        errors.push(
            "username: 1-150 characters, letters, digits and @/./+/-/_ only".to_string(),
        );
    }
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !valid {
        errors.push("email: enter a valid email address".to_string());
    }
}

fn into_result(errors: Vec<String>) -> Result<(), RequestError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RequestError::Unprocessable(errors))
    }
}

// ----------------- Post Request -----------------

/// An image file received with a post form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Raw post form fields as submitted; `None` means the field was not sent.
#[derive(Debug, Default)]
pub struct PostForm {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub is_published: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: i64,
    pub location_id: Option<i64>,
    pub is_published: bool,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    /// `Some(None)` clears the location.
    pub location_id: Option<Option<i64>>,
    pub is_published: Option<bool>,
    pub image: Option<ImageUpload>,
}

impl PostForm {
    pub fn into_new_post(self) -> Result<NewPost, RequestError> {
        let mut errors = Vec::new();
        let title = required(self.title, "title", &mut errors).and_then(|t| title_checked(t, &mut errors));
        let text = required(self.text, "text", &mut errors);
        let pub_date = required(self.pub_date, "pub_date", &mut errors)
            .and_then(|d| date_checked(&d, &mut errors));
        let category_id = required(self.category, "category", &mut errors)
            .and_then(|c| id_checked(&c, "category", &mut errors));
        let location_id = self
            .location
            .and_then(|l| optional_id_checked(&l, "location", &mut errors));
        let is_published = match self.is_published {
            Some(flag) => bool_checked(&flag, &mut errors),
            None => Some(true),
        };
        match (title, text, pub_date, category_id, is_published) {
            (Some(title), Some(text), Some(pub_date), Some(category_id), Some(is_published))
                if errors.is_empty() =>
            {
                Ok(NewPost {
                    title,
                    text,
                    pub_date,
                    category_id,
                    location_id,
                    is_published,
                    image: self.image,
                })
            }
            _ => Err(RequestError::Unprocessable(errors)),
        }
    }

    pub fn into_changes(self) -> Result<PostChanges, RequestError> {
        let mut errors = Vec::new();
        let title = self.title.and_then(|t| {
            let t = not_blank(t, "title", &mut errors)?;
            title_checked(t, &mut errors)
        });
        let text = self.text.and_then(|t| not_blank(t, "text", &mut errors));
        let pub_date = self.pub_date.and_then(|d| date_checked(&d, &mut errors));
        let category_id = self
            .category
            .and_then(|c| id_checked(&c, "category", &mut errors));
        let location_id = self.location.map(|l| {
            if l.trim().is_empty() {
                None
            } else {
                id_checked(&l, "location", &mut errors)
            }
        });
        let is_published = self.is_published.and_then(|f| bool_checked(&f, &mut errors));
        if !errors.is_empty() {
            return Err(RequestError::Unprocessable(errors));
        }
        Ok(PostChanges {
            title,
            text,
            pub_date,
            category_id,
            location_id,
            is_published,
            image: self.image,
        })
    }
}

fn required(value: Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(value) => not_blank(value, field, errors),
        None => {
            errors.push(format!("{}: this field is required", field));
            None
        }
    }
}

fn not_blank(value: String, field: &str, errors: &mut Vec<String>) -> Option<String> {
    if value.trim().is_empty() {
        errors.push(format!("{}: must not be empty", field));
        None
    } else {
        Some(value)
    }
}

fn title_checked(title: String, errors: &mut Vec<String>) -> Option<String> {
    if title.chars().count() > MAX_TITLE_LENGTH {
        errors.push(format!(
            "title: must be at most {} characters",
            MAX_TITLE_LENGTH
        ));
        None
    } else {
        Some(title)
    }
}

fn date_checked(value: &str, errors: &mut Vec<String>) -> Option<DateTime<Utc>> {
    let parsed = parse_pub_date(value);
    if parsed.is_none() {
        errors.push("pub_date: enter a valid date and time".to_string());
    }
    parsed
}

fn id_checked(value: &str, field: &str, errors: &mut Vec<String>) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(format!("{}: select a valid choice", field));
            None
        }
    }
}

fn optional_id_checked(value: &str, field: &str, errors: &mut Vec<String>) -> Option<i64> {
    if value.trim().is_empty() {
        None
    } else {
        id_checked(value, field, errors)
    }
}

fn bool_checked(value: &str, errors: &mut Vec<String>) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" | "" => Some(false),
        _ => {
            errors.push("is_published: expected true or false".to_string());
            None
        }
    }
}

/// Stored dates are compared as text, which only orders four-digit years.
const MAX_PUB_YEAR: i32 = 9999;

/// Accepts RFC 3339 or the `datetime-local` shape (`YYYY-MM-DDTHH:MM[:SS]`, read as UTC).
/// Sub-second precision is dropped.
pub fn parse_pub_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let parsed = match DateTime::parse_from_rfc3339(value) {
        Ok(date) => date.with_timezone(&Utc),
        Err(_) => {
            let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())?;
            Utc.from_utc_datetime(&naive)
        }
    };
    if !(1..=MAX_PUB_YEAR).contains(&parsed.year()) {
        return None;
    }
    Utc.timestamp_opt(parsed.timestamp(), 0).single()
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub text: String,
}

impl CommentRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.text.trim().is_empty() {
            return Err(RequestError::Unprocessable(vec![
                "text: must not be empty".to_string()
            ]));
        }
        Ok(())
    }
}

// ----------------- Admin Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CategoryRequest {
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(default = "published_by_default", rename = "isPublished")]
    pub is_published: bool,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateCategoryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "isPublished")]
    pub is_published: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LocationRequest {
    pub name: String,
    #[serde(default = "published_by_default", rename = "isPublished")]
    pub is_published: bool,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    #[serde(rename = "isPublished")]
    pub is_published: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct AdminPostUpdateRequest {
    pub category: Option<i64>,
    #[serde(rename = "isPublished")]
    pub is_published: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AdminCommentUpdateRequest {
    #[serde(rename = "isPublished")]
    pub is_published: bool,
}

fn published_by_default() -> bool {
    true
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl CategoryRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut errors = Vec::new();
        if not_blank(self.title.clone(), "title", &mut errors).is_some() {
            title_checked(self.title.clone(), &mut errors);
        }
        not_blank(self.description.clone(), "description", &mut errors);
        if !is_valid_slug(&self.slug) {
            errors.push(
                "slug: only latin letters, digits, hyphen and underscore are allowed".to_string(),
            );
        }
        into_result(errors)
    }
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            if not_blank(title.clone(), "title", &mut errors).is_some() {
                title_checked(title.clone(), &mut errors);
            }
        }
        if let Some(description) = &self.description {
            not_blank(description.clone(), "description", &mut errors);
        }
        if let Some(slug) = &self.slug {
            if !is_valid_slug(slug) {
                errors.push(
                    "slug: only latin letters, digits, hyphen and underscore are allowed"
                        .to_string(),
                );
            }
        }
        into_result(errors)
    }
}

fn location_name_checked(name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push("name: must not be empty".to_string());
    } else if name.chars().count() > MAX_TITLE_LENGTH {
        errors.push(format!("name: must be at most {} characters", MAX_TITLE_LENGTH));
    }
}

impl LocationRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut errors = Vec::new();
        location_name_checked(&self.name, &mut errors);
        into_result(errors)
    }
}

impl UpdateLocationRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            location_name_checked(name, &mut errors);
        }
        into_result(errors)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    fn form() -> PostForm {
        PostForm {
            title: Some("Hello".into()),
            text: Some("World".into()),
            pub_date: Some("2023-05-01T10:30".into()),
            category: Some("3".into()),
            ..Default::default()
        }
    }

    #[test]
    fn pub_date_accepts_datetime_local_and_rfc3339() {
        let local = parse_pub_date("2023-05-01T10:30").unwrap();
        assert_eq!((local.month(), local.hour(), local.minute()), (5, 10, 30));

        let offset = parse_pub_date("2023-05-01T12:30:00+02:00").unwrap();
        assert_eq!(offset, local);

        let fractional = parse_pub_date("2023-05-01T10:30:00.750Z").unwrap();
        assert_eq!(fractional, local);

        assert!(parse_pub_date("yesterday").is_none());
    }

    #[test]
    fn pub_date_rejects_years_past_9999_in_utc() {
        assert!(parse_pub_date("9999-12-31T23:30:00-01:00").is_none());
        assert!(parse_pub_date("0000-12-31T23:00").is_none());
        let last = parse_pub_date("9999-12-31T22:30:00-01:00").unwrap();
        assert_eq!(last.year(), 9999);
        assert_eq!(last.to_rfc3339(), "9999-12-31T23:30:00+00:00");
    }

    #[test]
    fn new_post_defaults_to_published_without_location() {
        let post = form().into_new_post().unwrap();
        assert!(post.is_published);
        assert_eq!(post.category_id, 3);
        assert_eq!(post.location_id, None);
    }

    #[test]
    fn new_post_collects_every_error() {
        let result = PostForm {
            title: Some("x".repeat(MAX_TITLE_LENGTH + 1)),
            text: Some("   ".into()),
            pub_date: Some("not a date".into()),
            ..Default::default()
        }
        .into_new_post();
        match result {
            Err(RequestError::Unprocessable(errors)) => {
                assert_eq!(errors.len(), 4, "{:?}", errors);
                assert!(errors.iter().any(|e| e.starts_with("category")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_location_clears_it_on_update() {
        let changes = PostForm {
            location: Some(String::new()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.location_id, Some(None));
        assert!(changes.title.is_none());
    }

    #[test]
    fn slug_alphabet() {
        assert!(is_valid_slug("travel_2023-summer"));
        assert!(!is_valid_slug("путешествия"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn blank_comment_is_rejected() {
        assert!(CommentRequest { text: " \n".into() }.validate().is_err());
        assert!(CommentRequest { text: "nice".into() }.validate().is_ok());
    }
}
