/// Comment handlers - HTTP endpoints for comment operations
use super::BlogState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::CommentForm;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Add a comment to a visible post
pub async fn add_comment(
    state: web::Data<BlogState>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentForm>,
) -> Result<HttpResponse> {
    let service = CommentService::new(state.store.clone());
    let comment = service.add(&user.0, *post_id, req.into_inner()).await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Current comment text for the author's edit form
pub async fn edit_comment(
    state: web::Data<BlogState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    let comment = service.edit_form(&user.0, post_id, comment_id).await?;

    Ok(HttpResponse::Ok().json(comment))
}

pub async fn update_comment(
    state: web::Data<BlogState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    req: web::Json<CommentForm>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    let comment = service
        .update(&user.0, post_id, comment_id, req.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

pub async fn delete_comment(
    state: web::Data<BlogState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    service.delete(&user.0, post_id, comment_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
