/// HTTP handlers for blog endpoints
///
/// This module contains handlers for:
/// - Posts: index feed, detail, create, edit, delete
/// - Comments: add, edit, delete
/// - Feeds: category listing
/// - Profiles: public profile feed, own profile edit
use crate::db::BlogStore;
use crate::error::AppError;
use crate::middleware::JwtViewerMiddleware;
use crate::services::Paginator;
use actix_web::web;
use serde::Deserialize;
use std::sync::Arc;

pub mod comments;
pub mod feeds;
pub mod posts;
pub mod profiles;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct BlogState {
    pub store: Arc<dyn BlogStore>,
    pub paginator: Paginator,
}

impl BlogState {
    pub fn new(store: Arc<dyn BlogStore>, page_size: i64) -> Self {
        Self {
            store,
            paginator: Paginator::new(page_size),
        }
    }
}

/// `?page=N`, 1-based.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

/// Register the `/api/v1` blog routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::ValidationError(err.to_string()).into()),
    )
    // `page` is the only query parameter; an unparsable page is a missing page
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::NotFound(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::NotFound(err.to_string()).into()),
    )
    .service(
        web::scope("/api/v1")
            .wrap(JwtViewerMiddleware)
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::index))
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/posts/{post_id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::put().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .route("/posts/{post_id}/edit", web::get().to(posts::edit_post))
            .route(
                "/posts/{post_id}/comments",
                web::post().to(comments::add_comment),
            )
            .service(
                web::resource("/posts/{post_id}/comments/{comment_id}")
                    .route(web::get().to(comments::edit_comment))
                    .route(web::put().to(comments::update_comment))
                    .route(web::delete().to(comments::delete_comment)),
            )
            .route(
                "/categories/{slug}/posts",
                web::get().to(feeds::category_posts),
            )
            .route("/profile", web::put().to(profiles::update_profile))
            .route("/profile/{username}", web::get().to(profiles::get_profile)),
    );
}
