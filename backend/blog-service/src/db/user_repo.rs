use super::{PgBlogStore, UserRepository};
use crate::error::Result;
use crate::models::{ProfileForm, User};
use async_trait::async_trait;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

#[async_trait]
impl UserRepository for PgBlogStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_user(&self, user_id: Uuid, changes: &ProfileForm) -> Result<Option<User>> {
        // unique violation on username surfaces as AppError::Conflict
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = $1, first_name = $2, last_name = $3, email = $4
            WHERE id = $5
            RETURNING id, username, first_name, last_name, email
            "#,
        )
        .bind(&changes.username)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
