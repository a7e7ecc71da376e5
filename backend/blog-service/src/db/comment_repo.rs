use super::{CommentRepository, PgBlogStore};
use crate::error::{AppError, Result};
use crate::models::{Author, Comment};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

const COMMENT_SELECT: &str = r#"
    SELECT cm.id, cm.post_id, cm.text, cm.created_at,
           u.id AS author_id, u.username AS author_username
    FROM comments cm
    JOIN users u ON u.id = cm.author_id
"#;

fn comment_from_row(row: &PgRow) -> std::result::Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author: Author {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CommentRepository for PgBlogStore {
    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!("{COMMENT_SELECT} WHERE cm.id = $1"))
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(comment_from_row).transpose()?)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "{COMMENT_SELECT} WHERE cm.post_id = $1 ORDER BY cm.created_at ASC, cm.id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let comments = rows
            .iter()
            .map(comment_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    async fn insert_comment(&self, post_id: Uuid, author_id: Uuid, text: &str) -> Result<Comment> {
        let comment_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO comments (id, post_id, author_id, text)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        self.find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::Internal("inserted comment vanished".into()))
    }

    async fn update_comment(&self, comment_id: Uuid, text: &str) -> Result<Option<Comment>> {
        let result = sqlx::query("UPDATE comments SET text = $1 WHERE id = $2")
            .bind(text)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_comment(comment_id).await
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
