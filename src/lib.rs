mod authentication;
pub mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod media;
mod models;
mod pagination;
pub mod telemetry;

use anyhow::Context;
pub use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
pub use db_helpers::set_staff_in_db;
pub use errors::{RequestError, RequestErrorJsonWrapper};
use handlers::*;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use std::{net::TcpListener, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Room for a maximum-size image plus the rest of the form.
const MAX_BODY_BYTES: usize = media::MAX_IMAGE_BYTES + 1024 * 1024;

pub async fn run_app(config: Config) -> Result<()> {
    let address = config.address()?;
    let db = init_db(&config.database_url).await?;
    let app = build_app(make_router(), db, config);
    tracing::info!(%address, "Server started");
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Serves `app` on an already bound listener.
pub async fn serve_on(app: Router, listener: TcpListener) -> Result<()> {
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Attaches the shared pool, configuration, media files and request tracing.
pub fn build_app(router: Router, db: SqlitePool, config: Config) -> Router {
    let media = ServeDir::new(&config.media_root);
    router
        .nest_service("/media", media)
        .layer(Extension(Arc::new(db)))
        .layer(Extension(Arc::new(config)))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {}", db_url))?;
    } else {
        tracing::debug!("Database already exists");
    }
    let options = SqliteConnectOptions::from_str(db_url)
        .context("Invalid DATABASE_URL")?
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;
    tracing::info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/users/login", post(login_user))
        .route("/users", post(register_user))
        .route("/user", get(get_current_user))
        .route("/", get(index))
        .route("/posts/create", post(create_post))
        .route("/posts/:post_id", get(post_detail))
        .route("/posts/:post_id/edit", post(edit_post))
        .route("/posts/:post_id/delete", post(delete_post))
        .route("/posts/:post_id/comment", post(add_comment))
        .route(
            "/posts/:post_id/edit_comment/:comment_id",
            post(edit_comment),
        )
        .route(
            "/posts/:post_id/delete_comment/:comment_id",
            post(delete_comment),
        )
        .route("/profile/:username", get(get_profile))
        .route("/edit_profile", post(edit_profile))
        .route("/category/:category_slug", get(category_posts))
        .nest("/admin", admin_router())
        .fallback(not_found)
}

fn admin_router() -> Router {
    Router::new()
        .route(
            "/categories",
            get(admin_list_categories).post(admin_create_category),
        )
        .route(
            "/categories/:id",
            get(admin_get_category)
                .put(admin_update_category)
                .delete(admin_delete_category),
        )
        .route(
            "/locations",
            get(admin_list_locations).post(admin_create_location),
        )
        .route(
            "/locations/:id",
            put(admin_update_location).delete(admin_delete_location),
        )
        .route("/posts", get(admin_list_posts))
        .route(
            "/posts/:id",
            put(admin_update_post).delete(admin_delete_post),
        )
        .route("/comments", get(admin_list_comments))
        .route(
            "/comments/:id",
            put(admin_update_comment).delete(admin_delete_comment),
        )
}
