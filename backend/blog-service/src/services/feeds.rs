/// Feed service - paginated post listings
use super::Paginator;
use crate::db::{BlogStore, CategoryRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::metrics::record_outcome;
use crate::models::{CategoryFeed, Page, Post, ProfileFeed, Viewer};
use crate::policy::{resolve_category_feed, resolve_index_feed, resolve_profile_feed};
use chrono::Utc;
use std::sync::Arc;

pub struct FeedService {
    store: Arc<dyn BlogStore>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(store: Arc<dyn BlogStore>, paginator: Paginator) -> Self {
        Self { store, paginator }
    }

    /// Front page: guest-visible posts of everybody, for every viewer.
    pub async fn index(&self, viewer: &Viewer, page: i64) -> Result<Page<Post>> {
        let now = Utc::now();
        let scope = resolve_index_feed(now);

        self.paginator
            .fetch(self.store.as_ref(), &scope, viewer, page, now)
            .await
    }

    pub async fn category(&self, viewer: &Viewer, slug: &str, page: i64) -> Result<CategoryFeed> {
        let now = Utc::now();
        let found = self.store.find_category_by_slug(slug).await?;
        let (category, scope) = record_outcome(
            "category_feed",
            resolve_category_feed(slug, found, viewer, now),
        )?;

        let posts = self
            .paginator
            .fetch(self.store.as_ref(), &scope, viewer, page, now)
            .await?;

        Ok(CategoryFeed { category, posts })
    }

    /// Profile page. The owner's own listing includes hidden posts.
    pub async fn profile(&self, viewer: &Viewer, username: &str, page: i64) -> Result<ProfileFeed> {
        let now = Utc::now();
        let profile = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

        let scope = resolve_profile_feed(viewer, &profile, now);
        tracing::debug!(
            owner_id = %profile.id,
            own_profile = viewer.is(profile.id),
            "profile feed resolved"
        );

        let posts = self
            .paginator
            .fetch(self.store.as_ref(), &scope, viewer, page, now)
            .await?;

        Ok(ProfileFeed { profile, posts })
    }
}
