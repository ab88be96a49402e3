use crate::error::AppError;
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tasks.db?mode=rwc";

/// Runtime settings, read once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub server_port: u16,
    pub server_host: String,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let secret_key = env::var("SECRET_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Configuration("SECRET_KEY must be set".into()))?;

        let database_url = env::var("DATABASE_URL")
            .map(|url| normalize_database_url(&url))
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a number".into()))?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| {
                    AppError::Configuration("BCRYPT_COST must be a number from 4 to 31".into())
                })?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url,
            secret_key,
            server_port,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

/// Rewrites the URL spellings other tools use into the form `sqlx` expects.
///
/// `sqlite:///relative.db` uses three slashes for a relative path, and hosting
/// platforms hand out PostgreSQL URLs as either `postgres://` or
/// `postgresql://`. Both schemes are folded into `postgres://`.
pub fn normalize_database_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("sqlite:///") {
        format!("sqlite://{}", rest)
    } else if let Some(rest) = url.strip_prefix("postgresql://") {
        format!("postgres://{}", rest)
    } else {
        url.to_string()
    }
}
