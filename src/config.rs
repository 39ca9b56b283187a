use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_POSTS_PER_PAGE: i64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub media_root: PathBuf,
    pub posts_per_page: i64,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let port = match env::var("PORT") {
            Ok(port) => port.parse().context("PORT must be a valid port number")?,
            Err(_) => 3001,
        };
        let posts_per_page = match env::var("POSTS_PER_PAGE") {
            Ok(size) => size
                .parse::<i64>()
                .ok()
                .filter(|size| *size > 0)
                .context("POSTS_PER_PAGE must be a positive integer")?,
            Err(_) => DEFAULT_POSTS_PER_PAGE,
        };
        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            jwt_secret,
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            posts_per_page,
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
        })
    }

    pub fn address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
