/// Comment service - comments on visible posts, author-only edits
use crate::db::{BlogStore, CommentRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::metrics::record_outcome;
use crate::models::{Comment, CommentForm, Identity, Viewer};
use crate::policy::{authorize_comment_change, resolve_post_detail};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct CommentService {
    store: Arc<dyn BlogStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Comment on a post the author can currently read.
    pub async fn add(
        &self,
        author: &Identity,
        post_id: Uuid,
        form: CommentForm,
    ) -> Result<Comment> {
        let viewer = Viewer::from(author.clone());
        let found = self.store.find_post(post_id).await?;
        let post = record_outcome("comment_add", resolve_post_detail(&viewer, found, Utc::now()))?;

        form.validate()?;
        let comment = self
            .store
            .insert_comment(post.id, author.id, &form.text)
            .await?;

        tracing::info!(comment_id = %comment.id, %post_id, author_id = %author.id, "comment added");
        Ok(comment)
    }

    /// Current text of a comment for its author's edit form.
    pub async fn edit_form(
        &self,
        editor: &Identity,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment> {
        self.load_for_change("comment_edit_form", editor, post_id, comment_id)
            .await
    }

    pub async fn update(
        &self,
        editor: &Identity,
        post_id: Uuid,
        comment_id: Uuid,
        form: CommentForm,
    ) -> Result<Comment> {
        self.load_for_change("comment_update", editor, post_id, comment_id)
            .await?;
        form.validate()?;

        let comment = self
            .store
            .update_comment(comment_id, &form.text)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

        tracing::info!(%comment_id, editor_id = %editor.id, "comment updated");
        Ok(comment)
    }

    pub async fn delete(&self, editor: &Identity, post_id: Uuid, comment_id: Uuid) -> Result<()> {
        self.load_for_change("comment_delete", editor, post_id, comment_id)
            .await?;

        if !self.store.delete_comment(comment_id).await? {
            return Err(AppError::NotFound(format!("Comment {} not found", comment_id)));
        }

        tracing::info!(%comment_id, editor_id = %editor.id, "comment deleted");
        Ok(())
    }

    /// The comment must exist under `post_id`; only then is ownership checked.
    async fn load_for_change(
        &self,
        operation: &str,
        editor: &Identity,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment> {
        let comment = self
            .store
            .find_comment(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id)
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

        let viewer = Viewer::from(editor.clone());
        let decision = record_outcome(operation, authorize_comment_change(&viewer, &comment));
        if let Err(err) = decision {
            tracing::info!(%comment_id, user_id = %editor.id, "comment change denied");
            return Err(err);
        }

        Ok(comment)
    }
}
