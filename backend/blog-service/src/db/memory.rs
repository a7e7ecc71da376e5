/// In-process store backed by hash maps.
///
/// Implements the same repository traits as [`super::PgBlogStore`] and is used
/// by the test suite and by `BLOG_STORE=memory` local runs. Listing filters go
/// through [`PostScope::admits`], so both stores honour one definition of the
/// scope.
use super::{CategoryRepository, CommentRepository, PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{
    Author, Category, Comment, Location, Post, PostDraft, ProfileForm, Publication, User,
};
use crate::policy::PostScope;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    draft: PostDraft,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, PostRow>,
    comments: HashMap<Uuid, CommentRow>,
    next_seq: u64,
}

impl Tables {
    fn author(&self, user_id: Uuid) -> Result<Author> {
        self.users
            .get(&user_id)
            .map(|user| Author {
                id: user.id,
                username: user.username.clone(),
            })
            .ok_or_else(|| AppError::Internal(format!("dangling author reference {}", user_id)))
    }

    fn hydrate_post(&self, row: &PostRow) -> Result<Post> {
        let comment_count = self
            .comments
            .values()
            .filter(|comment| comment.post_id == row.id)
            .count() as i64;

        Ok(Post {
            id: row.id,
            title: row.draft.title.clone(),
            text: row.draft.text.clone(),
            pub_date: row.draft.pub_date,
            author: self.author(row.author_id)?,
            category: row
                .draft
                .category_id
                .and_then(|id| self.categories.get(&id).cloned()),
            location: row
                .draft
                .location_id
                .and_then(|id| self.locations.get(&id).cloned()),
            image: row.draft.image.clone(),
            publication: Publication {
                is_published: row.draft.is_published,
                created_at: row.created_at,
            },
            comment_count,
        })
    }

    fn hydrate_comment(&self, row: &CommentRow) -> Result<Comment> {
        Ok(Comment {
            id: row.id,
            post_id: row.post_id,
            author: self.author(row.author_id)?,
            text: row.text.clone(),
            created_at: row.created_at,
        })
    }

    /// Posts admitted by `scope`, newest first.
    fn scoped_posts(&self, scope: &PostScope) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for row in self.posts.values() {
            let post = self.hydrate_post(row)?;
            if scope.admits(&post) {
                posts.push(post);
            }
        }

        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}

#[derive(Default)]
pub struct InMemoryBlogStore {
    tables: RwLock<Tables>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user as the identity provider would.
    pub async fn add_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: format!("{}@example.com", username),
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_category(&self, title: &str, slug: &str, is_published: bool) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            slug: slug.to_string(),
            publication: Publication {
                is_published,
                created_at: Utc::now(),
            },
        };
        self.tables
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        category
    }

    pub async fn add_location(&self, name: &str, is_published: bool) -> Location {
        let location = Location {
            id: Uuid::new_v4(),
            name: name.to_string(),
            publication: Publication {
                is_published,
                created_at: Utc::now(),
            },
        };
        self.tables
            .write()
            .await
            .locations
            .insert(location.id, location.clone());
        location
    }

    /// Administrative toggle of a category's publication flag.
    pub async fn set_category_published(&self, category_id: Uuid, is_published: bool) -> bool {
        match self.tables.write().await.categories.get_mut(&category_id) {
            Some(category) => {
                category.publication.is_published = is_published;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let tables = self.tables.read().await;
        tables
            .posts
            .get(&post_id)
            .map(|row| tables.hydrate_post(row))
            .transpose()
    }

    async fn list_posts(&self, scope: &PostScope, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        let posts = tables.scoped_posts(scope)?;

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_posts(&self, scope: &PostScope) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.scoped_posts(scope)?.len() as i64)
    }

    async fn insert_post(&self, author_id: Uuid, draft: &PostDraft) -> Result<Post> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&author_id) {
            return Err(AppError::NotFound(format!("User {} not found", author_id)));
        }

        let row = PostRow {
            id: Uuid::new_v4(),
            author_id,
            draft: draft.clone(),
            created_at: Utc::now(),
        };
        tables.posts.insert(row.id, row.clone());
        tables.hydrate_post(&row)
    }

    async fn update_post(&self, post_id: Uuid, draft: &PostDraft) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;
        let row = match tables.posts.get_mut(&post_id) {
            Some(row) => {
                row.draft = draft.clone();
                row.clone()
            }
            None => return Ok(None),
        };

        tables.hydrate_post(&row).map(Some)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let deleted = tables.posts.remove(&post_id).is_some();
        if deleted {
            tables.comments.retain(|_, comment| comment.post_id != post_id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let tables = self.tables.read().await;
        tables
            .comments
            .get(&comment_id)
            .map(|row| tables.hydrate_comment(row))
            .transpose()
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&CommentRow> = tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .collect();
        rows.sort_by_key(|comment| (comment.created_at, comment.seq));

        rows.into_iter()
            .map(|row| tables.hydrate_comment(row))
            .collect()
    }

    async fn insert_comment(&self, post_id: Uuid, author_id: Uuid, text: &str) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        tables.next_seq += 1;
        let row = CommentRow {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text: text.to_string(),
            created_at: Utc::now(),
            seq: tables.next_seq,
        };
        tables.comments.insert(row.id, row.clone());
        tables.hydrate_comment(&row)
    }

    async fn update_comment(&self, comment_id: Uuid, text: &str) -> Result<Option<Comment>> {
        let mut tables = self.tables.write().await;
        let row = match tables.comments.get_mut(&comment_id) {
            Some(row) => {
                row.text = text.to_string();
                row.clone()
            }
            None => return Ok(None),
        };

        tables.hydrate_comment(&row).map(Some)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        Ok(self
            .tables
            .write()
            .await
            .comments
            .remove(&comment_id)
            .is_some())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryBlogStore {
    async fn find_category(&self, category_id: Uuid) -> Result<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&category_id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self
            .tables
            .read()
            .await
            .categories
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn find_location(&self, location_id: Uuid) -> Result<Option<Location>> {
        Ok(self.tables.read().await.locations.get(&location_id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryBlogStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn update_user(&self, user_id: Uuid, changes: &ProfileForm) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|user| user.id != user_id && user.username == changes.username);
        if taken {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                changes.username
            )));
        }

        Ok(tables.users.get_mut(&user_id).map(|user| {
            user.username = changes.username.clone();
            user.first_name = changes.first_name.clone();
            user.last_name = changes.last_name.clone();
            user.email = changes.email.clone();
            user.clone()
        }))
    }
}
