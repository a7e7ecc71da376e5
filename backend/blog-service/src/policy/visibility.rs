/// Read-side visibility rules
///
/// A post is visible to a guest iff it is published, its `pub_date` is not in
/// the future, and it either has no category or its category is published.
/// A post is always visible to its author. Comments inherit the visibility of
/// their post.
use crate::error::{AppError, Result};
use crate::models::{Category, Post, User, Viewer};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Visibility requirement carried by a [`PostScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// No publication filtering. Only produced for an owner viewing their own posts.
    Everything,
    /// Only posts passing the guest predicate at `now`.
    GuestVisible { now: DateTime<Utc> },
}

/// Explicit description of a post listing. Repositories translate it into a
/// query; [`PostScope::admits`] evaluates the same conditions in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostScope {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub visibility: Visibility,
}

impl PostScope {
    /// Guest-visible posts of every author and category.
    pub fn guest_visible(now: DateTime<Utc>) -> Self {
        Self {
            author_id: None,
            category_id: None,
            visibility: Visibility::GuestVisible { now },
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Whether `post` belongs to this listing.
    pub fn admits(&self, post: &Post) -> bool {
        if let Some(author_id) = self.author_id {
            if post.author.id != author_id {
                return false;
            }
        }

        if let Some(category_id) = self.category_id {
            if post.category.as_ref().map(|c| c.id) != Some(category_id) {
                return false;
            }
        }

        match self.visibility {
            Visibility::Everything => true,
            Visibility::GuestVisible { now } => is_visible_to_guest(post, now),
        }
    }
}

/// The guest predicate.
pub fn is_visible_to_guest(post: &Post, now: DateTime<Utc>) -> bool {
    post.publication.is_published
        && post.pub_date <= now
        && post
            .category
            .as_ref()
            .map_or(true, |category| category.publication.is_published)
}

/// Authors see their own posts unconditionally; everybody else gets the guest predicate.
pub fn is_visible_to(viewer: &Viewer, post: &Post, now: DateTime<Utc>) -> bool {
    viewer.is(post.author.id) || is_visible_to_guest(post, now)
}

/// Keep the posts `viewer` may read, preserving order.
pub fn filter_visible(viewer: &Viewer, candidates: Vec<Post>, now: DateTime<Utc>) -> Vec<Post> {
    candidates
        .into_iter()
        .filter(|post| is_visible_to(viewer, post, now))
        .collect()
}

/// Single-post lookup. A hidden post is reported exactly like a missing one.
pub fn resolve_post_detail(
    viewer: &Viewer,
    post: Option<Post>,
    now: DateTime<Utc>,
) -> Result<Post> {
    match post {
        Some(post) if is_visible_to(viewer, &post, now) => Ok(post),
        Some(post) => {
            tracing::debug!(post_id = %post.id, "post hidden from viewer");
            Err(AppError::NotFound(format!("Post {} not found", post.id)))
        }
        None => Err(AppError::NotFound("Post not found".to_string())),
    }
}

/// Front-page listing: guest-visible for every viewer.
pub fn resolve_index_feed(now: DateTime<Utc>) -> PostScope {
    PostScope::guest_visible(now)
}

/// Profile listing. The owner sees every one of their posts; anybody else only
/// the guest-visible ones.
pub fn resolve_profile_feed(viewer: &Viewer, owner: &User, now: DateTime<Utc>) -> PostScope {
    let visibility = if viewer.is(owner.id) {
        Visibility::Everything
    } else {
        Visibility::GuestVisible { now }
    };

    PostScope {
        author_id: Some(owner.id),
        category_id: None,
        visibility,
    }
}

/// Category listing. An unpublished category does not exist for anybody, and
/// its listing is guest-scoped even for the authors in it.
pub fn resolve_category_feed(
    slug: &str,
    category: Option<Category>,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> Result<(Category, PostScope)> {
    match category {
        Some(category) if category.publication.is_published => {
            let scope = PostScope::guest_visible(now).in_category(category.id);
            Ok((category, scope))
        }
        _ => {
            tracing::debug!(
                %slug,
                authenticated = viewer.is_authenticated(),
                "category unavailable"
            );
            Err(AppError::NotFound(format!("Category {} not found", slug)))
        }
    }
}
