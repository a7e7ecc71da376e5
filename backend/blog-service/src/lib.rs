/// Blog Service Library
///
/// Posts, comments, categories and profiles for a small publishing platform.
/// Every read and write path goes through the visibility and ownership policy.
///
/// # Modules
///
/// - `policy`: Visibility and ownership decisions (pure functions)
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for posts, comments, categories, users
/// - `services`: Business logic layer
/// - `db`: Repository traits with PostgreSQL and in-memory implementations
/// - `middleware`: Bearer-token viewer resolution and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
