/// Page arithmetic for listings.
///
/// Pages are 1-based. An empty listing still has one (empty) page; any page
/// outside `1..=num_pages` is NotFound.
use crate::db::{BlogStore, PostRepository};
use crate::error::{AppError, Result};
use crate::models::{Page, Post, Viewer};
use crate::policy::{filter_visible, PostScope};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: i64,
}

impl Paginator {
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn num_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            1
        } else {
            (total + self.page_size - 1) / self.page_size
        }
    }

    /// Offset of `page`, or NotFound when it lies outside the listing.
    pub fn offset(&self, page: i64, total: i64) -> Result<i64> {
        let num_pages = self.num_pages(total);
        if page < 1 || page > num_pages {
            return Err(AppError::NotFound(format!(
                "Page {} not found ({} pages)",
                page, num_pages
            )));
        }
        Ok((page - 1) * self.page_size)
    }

    /// Fetch one page of `scope`, re-checking every post against `viewer`.
    pub async fn fetch(
        &self,
        store: &dyn BlogStore,
        scope: &PostScope,
        viewer: &Viewer,
        page: i64,
        now: DateTime<Utc>,
    ) -> Result<Page<Post>> {
        let total = store.count_posts(scope).await?;
        let offset = self.offset(page, total)?;
        let candidates = store.list_posts(scope, self.page_size, offset).await?;
        let fetched = candidates.len();

        let items = filter_visible(viewer, candidates, now);
        if items.len() != fetched {
            tracing::warn!(
                fetched,
                kept = items.len(),
                "store returned posts outside the requested scope"
            );
        }

        let num_pages = self.num_pages(total);
        Ok(Page {
            items,
            page,
            page_size: self.page_size,
            total,
            num_pages,
            has_next: page < num_pages,
            has_previous: page > 1,
        })
    }
}
