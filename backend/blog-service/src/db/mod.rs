/// Database access layer
///
/// This module provides:
/// - Repository traits for posts, comments, categories/locations and users
/// - `PgBlogStore`: PostgreSQL implementation (one file per repository)
/// - `InMemoryBlogStore`: in-process implementation for tests and local runs
///
/// Repositories never apply visibility rules of their own. Post listings take a
/// [`PostScope`] built by the policy module and translate it as-is.
use crate::error::Result;
use crate::models::{Category, Comment, Location, Post, PostDraft, ProfileForm, User};
use crate::policy::PostScope;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub mod category_repo;
pub mod comment_repo;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use memory::InMemoryBlogStore;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fetch a post regardless of its visibility.
    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Posts admitted by `scope`, newest `pub_date` first.
    async fn list_posts(&self, scope: &PostScope, limit: i64, offset: i64) -> Result<Vec<Post>>;

    async fn count_posts(&self, scope: &PostScope) -> Result<i64>;

    async fn insert_post(&self, author_id: Uuid, draft: &PostDraft) -> Result<Post>;

    async fn update_post(&self, post_id: Uuid, draft: &PostDraft) -> Result<Option<Post>>;

    /// Delete a post together with its comments.
    async fn delete_post(&self, post_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    async fn insert_comment(&self, post_id: Uuid, author_id: Uuid, text: &str) -> Result<Comment>;

    async fn update_comment(&self, comment_id: Uuid, text: &str) -> Result<Option<Comment>>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_category(&self, category_id: Uuid) -> Result<Option<Category>>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    async fn find_location(&self, location_id: Uuid) -> Result<Option<Location>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Overwrite profile fields. A taken username is a `Conflict`.
    async fn update_user(&self, user_id: Uuid, changes: &ProfileForm) -> Result<Option<User>>;
}

/// Everything the services need from storage.
pub trait BlogStore: PostRepository + CommentRepository + CategoryRepository + UserRepository {}

impl<T> BlogStore for T where
    T: PostRepository + CommentRepository + CategoryRepository + UserRepository
{
}

/// PostgreSQL-backed store. The repository impls live in the sibling modules.
#[derive(Clone)]
pub struct PgBlogStore {
    pool: PgPool,
}

impl PgBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Apply embedded migrations from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
