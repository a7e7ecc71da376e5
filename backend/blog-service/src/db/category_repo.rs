use super::{CategoryRepository, PgBlogStore};
use crate::error::Result;
use crate::models::{Category, Location, Publication};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

fn category_from_row(row: &PgRow) -> std::result::Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        slug: row.try_get("slug")?,
        publication: Publication {
            is_published: row.try_get("is_published")?,
            created_at: row.try_get("created_at")?,
        },
    })
}

#[async_trait]
impl CategoryRepository for PgBlogStore {
    async fn find_category(&self, category_id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row).transpose()?)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row).transpose()?)
    }

    async fn find_location(&self, location_id: Uuid) -> Result<Option<Location>> {
        let row = sqlx::query(
            "SELECT id, name, is_published, created_at FROM locations WHERE id = $1",
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        let location = row
            .map(|row| -> std::result::Result<Location, sqlx::Error> {
                Ok(Location {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    publication: Publication {
                        is_published: row.try_get("is_published")?,
                        created_at: row.try_get("created_at")?,
                    },
                })
            })
            .transpose()?;

        Ok(location)
    }
}
