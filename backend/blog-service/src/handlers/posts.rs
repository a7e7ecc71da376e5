/// Post handlers - HTTP endpoints for post operations
use super::{BlogState, PageQuery};
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::{PostForm, Viewer};
use crate::services::{FeedService, PostService};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Index feed
/// GET /api/v1/posts?page=N
pub async fn index(
    state: web::Data<BlogState>,
    viewer: Viewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let service = FeedService::new(state.store.clone(), state.paginator);
    let page = service.index(&viewer, query.page).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Create a new post
pub async fn create_post(
    state: web::Data<BlogState>,
    user: AuthenticatedUser,
    req: web::Json<PostForm>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.create(&user.0, req.into_inner()).await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a post with its comments
pub async fn get_post(
    state: web::Data<BlogState>,
    viewer: Viewer,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let detail = service.detail(&viewer, *post_id).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Current post values for the author's edit form
pub async fn edit_post(
    state: web::Data<BlogState>,
    viewer: Viewer,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.edit_form(&viewer, *post_id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Guests and non-authors are redirected to the post's detail page
pub async fn update_post(
    state: web::Data<BlogState>,
    viewer: Viewer,
    post_id: web::Path<Uuid>,
    req: web::Json<PostForm>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.update(&viewer, *post_id, req.into_inner()).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post and its comments
pub async fn delete_post(
    state: web::Data<BlogState>,
    viewer: Viewer,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    service.delete(&viewer, *post_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
