/// Configuration management for Blog Service
///
/// All settings come from environment variables (optionally via a `.env`
/// file loaded in `main`). Invalid values are errors, missing ones fall back
/// to development defaults.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Listing configuration
    pub feed: FeedConfig,
    /// Logging configuration
    pub log: LogConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }
}

/// Which repository implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Posts per page
    pub page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let cors = {
            let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
                Some(value) => value,
                None if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                None => "http://localhost:3000".to_string(),
            };

            let cors = CorsConfig { allowed_origins };
            if production && cors.origins().any(|origin| origin == "*") {
                return Err("CORS_ALLOWED_ORIGINS cannot contain '*' in production".to_string());
            }

            cors
        };

        let page_size: i64 = parse_or_default(&lookup, "BLOG_PAGE_SIZE", 10)?;
        if page_size <= 0 {
            return Err(format!("BLOG_PAGE_SIZE must be positive, got {}", page_size));
        }

        Ok(Config {
            app: AppConfig {
                host: lookup("BLOG_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or_default(&lookup, "BLOG_SERVICE_PORT", 8085)?,
                env: app_env,
            },
            cors,
            database: DatabaseConfig {
                backend: parse_or_default(&lookup, "BLOG_STORE", StoreBackend::Postgres)?,
                url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "postgresql://localhost/blogicum".to_string()),
                max_connections: parse_or_default(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_or_default(&lookup, "DATABASE_RUN_MIGRATIONS", false)?,
            },
            feed: FeedConfig { page_size },
            log: LogConfig {
                json: lookup("LOG_FORMAT")
                    .map(|format| format.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
        })
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}
