/// Profile handlers
use super::{BlogState, PageQuery};
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::{ProfileForm, Viewer};
use crate::services::{FeedService, ProfileService};
use actix_web::{web, HttpResponse};

/// Public profile with the posts this viewer may see
/// GET /api/v1/profile/{username}?page=N
pub async fn get_profile(
    state: web::Data<BlogState>,
    viewer: Viewer,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let service = FeedService::new(state.store.clone(), state.paginator);
    let feed = service.profile(&viewer, &username, query.page).await?;

    Ok(HttpResponse::Ok().json(feed))
}

/// Edit the caller's own profile
/// PUT /api/v1/profile
pub async fn update_profile(
    state: web::Data<BlogState>,
    user: AuthenticatedUser,
    req: web::Json<ProfileForm>,
) -> Result<HttpResponse> {
    let service = ProfileService::new(state.store.clone());
    let profile = service.update(&user.0, req.into_inner()).await?;

    Ok(HttpResponse::Ok().json(profile))
}
