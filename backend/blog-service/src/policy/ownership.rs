/// Ownership-based permission checks for posts and comments
///
/// Only the author of an item may modify it; there is no staff override.
/// Denials surface differently per item kind: a post mutation redirects to the
/// post's detail page, a comment mutation is Forbidden.
use crate::error::{AppError, Result};
use crate::models::{Comment, Post, Viewer};
use uuid::Uuid;

/// Anything with a single owning author.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author.id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author.id
    }
}

/// True iff `viewer` is authenticated and is the item's author.
pub fn can_modify<T: Authored>(viewer: &Viewer, item: &T) -> bool {
    viewer.is(item.author_id())
}

/// Canonical read URL of a post.
pub fn post_detail_url(post_id: Uuid) -> String {
    format!("/api/v1/posts/{}", post_id)
}

/// Gate for post edit/delete. A non-author is sent back to the post's detail page.
pub fn authorize_post_change(viewer: &Viewer, post: &Post) -> Result<()> {
    if can_modify(viewer, post) {
        Ok(())
    } else {
        Err(AppError::Redirect(post_detail_url(post.id)))
    }
}

/// Gate for comment edit/delete.
pub fn authorize_comment_change(viewer: &Viewer, comment: &Comment) -> Result<()> {
    if can_modify(viewer, comment) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this comment".to_string(),
        ))
    }
}
