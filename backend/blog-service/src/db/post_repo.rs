use super::{PgBlogStore, PostRepository};
use crate::error::Result;
use crate::models::{Author, Category, Location, Post, PostDraft, Publication};
use crate::policy::{PostScope, Visibility};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.image, p.is_published, p.created_at,
           u.id AS author_id, u.username AS author_username,
           c.id AS category_id, c.title AS category_title,
           c.description AS category_description, c.slug AS category_slug,
           c.is_published AS category_is_published, c.created_at AS category_created_at,
           l.id AS location_id, l.name AS location_name,
           l.is_published AS location_is_published, l.created_at AS location_created_at,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

fn post_from_row(row: &PgRow) -> std::result::Result<Post, sqlx::Error> {
    let category = match row.try_get::<Option<Uuid>, _>("category_id")? {
        Some(id) => Some(Category {
            id,
            title: row.try_get("category_title")?,
            description: row.try_get("category_description")?,
            slug: row.try_get("category_slug")?,
            publication: Publication {
                is_published: row.try_get("category_is_published")?,
                created_at: row.try_get("category_created_at")?,
            },
        }),
        None => None,
    };

    let location = match row.try_get::<Option<Uuid>, _>("location_id")? {
        Some(id) => Some(Location {
            id,
            name: row.try_get("location_name")?,
            publication: Publication {
                is_published: row.try_get("location_is_published")?,
                created_at: row.try_get("location_created_at")?,
            },
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        author: Author {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        category,
        location,
        image: row.try_get("image")?,
        publication: Publication {
            is_published: row.try_get("is_published")?,
            created_at: row.try_get("created_at")?,
        },
        comment_count: row.try_get("comment_count")?,
    })
}

/// Append the WHERE clause for `scope`. Expects `p` and `c` aliases in the query.
fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: &PostScope) {
    qb.push(" WHERE TRUE");

    if let Some(author_id) = scope.author_id {
        qb.push(" AND p.author_id = ").push_bind(author_id);
    }

    if let Some(category_id) = scope.category_id {
        qb.push(" AND p.category_id = ").push_bind(category_id);
    }

    if let Visibility::GuestVisible { now } = scope.visibility {
        qb.push(" AND p.is_published AND p.pub_date <= ")
            .push_bind(now)
            .push(" AND (p.category_id IS NULL OR c.is_published)");
    }
}

#[async_trait]
impl PostRepository for PgBlogStore {
    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(post_from_row).transpose()?)
    }

    async fn list_posts(&self, scope: &PostScope, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        push_scope(&mut qb, scope);
        qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let posts = rows
            .iter()
            .map(post_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    async fn count_posts(&self, scope: &PostScope) -> Result<i64> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) AS count FROM posts p LEFT JOIN categories c ON c.id = p.category_id",
        );
        push_scope(&mut qb, scope);

        let row = qb.build().fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("count")?)
    }

    async fn insert_post(&self, author_id: Uuid, draft: &PostDraft) -> Result<Post> {
        let post_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (id, title, text, pub_date, author_id, category_id, location_id,
                               image, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(draft.pub_date)
        .bind(author_id)
        .bind(draft.category_id)
        .bind(draft.location_id)
        .bind(&draft.image)
        .bind(draft.is_published)
        .fetch_one(&self.pool)
        .await?;

        self.find_post(post_id)
            .await?
            .ok_or_else(|| crate::error::AppError::Internal("inserted post vanished".into()))
    }

    async fn update_post(&self, post_id: Uuid, draft: &PostDraft) -> Result<Option<Post>> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, text = $2, pub_date = $3, category_id = $4, location_id = $5,
                image = $6, is_published = $7
            WHERE id = $8
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(draft.pub_date)
        .bind(draft.category_id)
        .bind(draft.location_id)
        .bind(&draft.image)
        .bind(draft.is_published)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_post(post_id).await
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        // comments go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
