#![allow(dead_code)]

use std::{net::TcpListener, path::PathBuf};

use blogicum::{build_app, init_db, make_router, serve_on, set_staff_in_db, Config};
use chrono::{Duration, Utc};
use reqwest::{multipart::Form, redirect::Policy, Client, Response};
use serde_json::{json, Value};
use sqlx::SqlitePool;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub pool: SqlitePool,
    pub root: PathBuf,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_page_size(10).await
}

/// Starts the server on a free port against a fresh database file.
pub async fn spawn_app_with_page_size(posts_per_page: i64) -> TestApp {
    let root = std::env::temp_dir().join(format!("blogicum-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();
    let config = Config {
        database_url: format!("sqlite://{}", root.join("blog.db").display()),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        media_root: root.join("media"),
        posts_per_page,
        json_logs: false,
    };
    let pool = init_db(&config.database_url).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    let app = build_app(make_router(), pool.clone(), config);
    tokio::spawn(serve_on(app, listener));

    let client = Client::builder().redirect(Policy::none()).build().unwrap();
    TestApp {
        address,
        client,
        pool,
        root,
    }
}

pub fn hours_from_now(hours: i64) -> String {
    (Utc::now() + Duration::hours(hours)).to_rfc3339()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.header("Authorization", format!("Token {}", token));
        }
        request.send().await.unwrap()
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> Response {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Token {}", token));
        }
        request.send().await.unwrap()
    }

    pub async fn put_json(&self, path: &str, token: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Token {}", token))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str, token: &str) -> Response {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Token {}", token))
            .send()
            .await
            .unwrap()
    }

    pub async fn post_form(&self, path: &str, token: Option<&str>, form: Form) -> Response {
        let mut request = self.client.post(self.url(path)).multipart(form);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Token {}", token));
        }
        request.send().await.unwrap()
    }

    /// Registers `username` and returns its token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post_json(
                "/users",
                None,
                json!({"user": {
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                }}),
            )
            .await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.unwrap();
        body["user"]["token"].as_str().unwrap().to_string()
    }

    pub async fn register_staff(&self, username: &str) -> String {
        let token = self.register(username).await;
        set_staff_in_db(&self.pool, username, true).await.unwrap();
        token
    }

    pub async fn create_category(&self, staff: &str, slug: &str, published: bool) -> i64 {
        let response = self
            .post_json(
                "/admin/categories",
                Some(staff),
                json!({
                    "title": format!("Category {}", slug),
                    "description": "About things",
                    "slug": slug,
                    "isPublished": published,
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    pub async fn create_location(&self, staff: &str, name: &str, published: bool) -> i64 {
        let response = self
            .post_json(
                "/admin/locations",
                Some(staff),
                json!({"name": name, "isPublished": published}),
            )
            .await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Creates a post and returns its id.
    pub async fn create_post(
        &self,
        token: &str,
        title: &str,
        category: i64,
        pub_date: String,
        published: bool,
    ) -> i64 {
        let form = Form::new()
            .text("title", title.to_string())
            .text("text", format!("Body of {}", title))
            .text("pub_date", pub_date)
            .text("category", category.to_string())
            .text("is_published", published.to_string());
        let response = self.post_form("/posts/create", Some(token), form).await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.unwrap();
        body["post"]["id"].as_i64().unwrap()
    }

    pub async fn json(&self, path: &str, token: Option<&str>) -> Value {
        let response = self.get(path, token).await;
        assert_eq!(response.status(), 200, "GET {}", path);
        response.json().await.unwrap()
    }
}

pub fn titles(page: &Value) -> Vec<String> {
    page["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["title"].as_str().unwrap().to_string())
        .collect()
}
