/// Post service - detail reads and author-only mutations
use crate::db::{BlogStore, CategoryRepository, CommentRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::metrics::record_outcome;
use crate::models::{Identity, Post, PostDetail, PostDraft, PostForm, Viewer};
use crate::policy::{authorize_post_change, resolve_post_detail};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct PostService {
    store: Arc<dyn BlogStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Post with its comments, if `viewer` may read it.
    pub async fn detail(&self, viewer: &Viewer, post_id: Uuid) -> Result<PostDetail> {
        let now = Utc::now();
        let found = self.store.find_post(post_id).await?;
        let post = record_outcome("post_detail", resolve_post_detail(viewer, found, now))?;
        let comments = self.store.list_comments(post.id).await?;

        Ok(PostDetail { post, comments })
    }

    pub async fn create(&self, author: &Identity, form: PostForm) -> Result<Post> {
        form.validate()?;
        let draft = self.draft_from(form, None).await?;
        let post = self.store.insert_post(author.id, &draft).await?;

        tracing::info!(post_id = %post.id, author_id = %author.id, "post created");
        Ok(post)
    }

    /// Current values of a post for its author's edit form.
    pub async fn edit_form(&self, editor: &Viewer, post_id: Uuid) -> Result<Post> {
        self.load_for_change("post_edit_form", editor, post_id).await
    }

    pub async fn update(&self, editor: &Viewer, post_id: Uuid, form: PostForm) -> Result<Post> {
        let current = self.load_for_change("post_update", editor, post_id).await?;
        form.validate()?;

        let draft = self.draft_from(form, Some(&current)).await?;
        let post = self
            .store
            .update_post(post_id, &draft)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

        tracing::info!(%post_id, editor_id = ?editor.user_id(), "post updated");
        Ok(post)
    }

    pub async fn delete(&self, editor: &Viewer, post_id: Uuid) -> Result<()> {
        self.load_for_change("post_delete", editor, post_id).await?;

        if !self.store.delete_post(post_id).await? {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        tracing::info!(%post_id, editor_id = ?editor.user_id(), "post deleted");
        Ok(())
    }

    async fn load_for_change(
        &self,
        operation: &str,
        editor: &Viewer,
        post_id: Uuid,
    ) -> Result<Post> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

        let decision = record_outcome(operation, authorize_post_change(editor, &post));
        if let Err(err) = decision {
            tracing::info!(%post_id, user_id = ?editor.user_id(), "post change denied");
            return Err(err);
        }

        Ok(post)
    }

    /// Resolve references and defaults. Fields the form leaves out keep their
    /// `current` values on update; a new post is dated now and published.
    async fn draft_from(&self, form: PostForm, current: Option<&Post>) -> Result<PostDraft> {
        if let Some(category_id) = form.category_id {
            if self.store.find_category(category_id).await?.is_none() {
                return Err(AppError::ValidationError(format!(
                    "category_id: unknown category {}",
                    category_id
                )));
            }
        }

        if let Some(location_id) = form.location_id {
            if self.store.find_location(location_id).await?.is_none() {
                return Err(AppError::ValidationError(format!(
                    "location_id: unknown location {}",
                    location_id
                )));
            }
        }

        let (default_pub_date, default_published) = match current {
            Some(post) => (post.pub_date, post.publication.is_published),
            None => (Utc::now(), true),
        };

        Ok(PostDraft {
            title: form.title,
            text: form.text,
            pub_date: form.pub_date.unwrap_or(default_pub_date),
            is_published: form.is_published.unwrap_or(default_published),
            category_id: form.category_id,
            location_id: form.location_id,
            image: form.image.filter(|key| !key.is_empty()),
        })
    }
}
