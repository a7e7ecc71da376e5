use super::{BlogState, PageQuery};
use crate::error::Result;
use crate::models::Viewer;
use crate::services::FeedService;
use actix_web::{web, HttpResponse};

/// Posts of a published category
/// GET /api/v1/categories/{slug}/posts?page=N
pub async fn category_posts(
    state: web::Data<BlogState>,
    viewer: Viewer,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let service = FeedService::new(state.store.clone(), state.paginator);
    let feed = service.category(&viewer, &slug, query.page).await?;

    Ok(HttpResponse::Ok().json(feed))
}
