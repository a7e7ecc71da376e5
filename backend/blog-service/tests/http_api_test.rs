//! HTTP Tests: blog API
//!
//! Drives the actix app end to end against the in-memory store.
//!
//! Coverage:
//! - Visibility of posts on every read path (index, detail, category, profile)
//! - Redirect vs Forbidden for non-author post/comment mutations
//! - Login-required writes, bearer token rejection
//! - Pagination bounds, profile edits

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use blog_service::db::{CommentRepository, PostRepository};
use chrono::{Duration, Utc};
use common::{bearer, Fixture};
use serde_json::{json, Value};

fn titles(listing: &Value) -> Vec<String> {
    listing["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|post| post["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[actix_web::test]
async fn index_lists_only_guest_visible_posts_for_everyone() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    fx.post(&fx.alice, "shown", now - Duration::days(1), true, Some(&fx.travel))
        .await;
    fx.post(&fx.alice, "draft", now - Duration::days(1), false, None)
        .await;
    fx.post(&fx.alice, "deferred", now + Duration::days(1), true, None)
        .await;
    fx.post(&fx.alice, "hidden-category", now - Duration::days(1), true, Some(&fx.drafts))
        .await;
    let app = blog_app!(fx);

    let req = test::TestRequest::get().uri("/api/v1/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(titles(&body), vec!["shown"]);

    // the author gets the same front page
    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(bearer(&fx.alice))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(titles(&body), vec!["shown"]);
}

#[actix_web::test]
async fn future_post_detail_is_not_found_for_guest_but_visible_to_author() {
    let fx = Fixture::new().await;
    let post = fx
        .post(&fx.alice, "tomorrow", Utc::now() + Duration::days(1), true, None)
        .await;
    let app = blog_app!(fx);
    let uri = format!("/api/v1/posts/{}", post.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&fx.bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&fx.alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["post"]["title"], "tomorrow");
}

#[actix_web::test]
async fn unpublished_category_hides_post_from_bob_only() {
    let fx = Fixture::new().await;
    let post = fx
        .post(&fx.alice, "secret", Utc::now() - Duration::days(1), true, Some(&fx.drafts))
        .await;
    let app = blog_app!(fx);
    let uri = format!("/api/v1/posts/{}", post.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&fx.bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&fx.alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn detail_lists_comments_oldest_first() {
    let fx = Fixture::new().await;
    let post = fx.visible_post(&fx.alice, "chatty").await;
    fx.store.insert_comment(post.id, fx.bob.id, "first").await.unwrap();
    fx.store.insert_comment(post.id, fx.alice.id, "second").await.unwrap();
    let app = blog_app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", post.id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;

    let texts: Vec<&str> = body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(body["post"]["comment_count"], 2);
}

#[actix_web::test]
async fn non_author_post_update_redirects_to_detail() {
    let fx = Fixture::new().await;
    let post = fx.visible_post(&fx.alice, "original").await;
    let app = blog_app!(fx);
    let uri = format!("/api/v1/posts/{}", post.id);
    let payload = json!({"title": "hijacked", "text": "mine now"});

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&fx.bob))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), uri.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("{}/edit", uri))
        .insert_header(bearer(&fx.bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&fx.alice))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "hijacked");
}

#[actix_web::test]
async fn post_delete_requires_ownership_and_cascades() {
    let fx = Fixture::new().await;
    let post = fx.visible_post(&fx.alice, "doomed").await;
    let comment = fx.store.insert_comment(post.id, fx.bob.id, "rip").await.unwrap();
    let app = blog_app!(fx);
    let uri = format!("/api/v1/posts/{}", post.id);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), uri.as_str());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&fx.bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&fx.alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    assert!(fx.store.find_post(post.id).await.unwrap().is_none());
    assert!(fx.store.find_comment(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn guest_post_change_redirects_to_detail() {
    let fx = Fixture::new().await;
    let post = fx.visible_post(&fx.alice, "mine").await;
    let app = blog_app!(fx);
    let uri = format!("/api/v1/posts/{}", post.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({"title": "guest edit", "text": "nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), uri.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("{}/edit", uri))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let missing = format!("/api/v1/posts/{}", uuid::Uuid::new_v4());
    let req = test::TestRequest::delete().uri(&missing).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let stored = fx.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "mine");
}

#[actix_web::test]
async fn guest_cannot_create_post() {
    let fx = Fixture::new().await;
    let app = blog_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(json!({"title": "anon", "text": "body"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn non_author_comment_change_is_forbidden() {
    let fx = Fixture::new().await;
    let post = fx.visible_post(&fx.alice, "open").await;
    let comment = fx.store.insert_comment(post.id, fx.alice.id, "mine").await.unwrap();
    let app = blog_app!(fx);
    let uri = format!("/api/v1/posts/{}/comments/{}", post.id, comment.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&fx.bob))
        .set_json(json!({"text": "edited by bob"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&fx.bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&fx.alice))
        .set_json(json!({"text": "edited"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["text"], "edited");
}

#[actix_web::test]
async fn comment_under_wrong_post_is_not_found() {
    let fx = Fixture::new().await;
    let post = fx.visible_post(&fx.alice, "one").await;
    let other = fx.visible_post(&fx.alice, "two").await;
    let comment = fx.store.insert_comment(post.id, fx.alice.id, "here").await.unwrap();
    let app = blog_app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}/comments/{}", other.id, comment.id))
        .insert_header(bearer(&fx.alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn comments_only_on_posts_the_commenter_can_see() {
    let fx = Fixture::new().await;
    let draft = fx
        .post(&fx.alice, "draft", Utc::now() - Duration::days(1), false, None)
        .await;
    let app = blog_app!(fx);
    let uri = format!("/api/v1/posts/{}/comments", draft.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"text": "hello"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&fx.bob))
        .set_json(json!({"text": "hello"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&fx.alice))
        .set_json(json!({"text": "note to self"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn category_feed_requires_published_category() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    fx.post(&fx.alice, "trip", now - Duration::days(2), true, Some(&fx.travel))
        .await;
    fx.post(&fx.alice, "trip-draft", now - Duration::days(1), false, Some(&fx.travel))
        .await;
    fx.visible_post(&fx.alice, "uncategorized").await;
    let app = blog_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/categories/travel/posts")
        .insert_header(bearer(&fx.alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["category"]["slug"], "travel");
    assert_eq!(titles(&body["posts"]), vec!["trip"]);

    let req = test::TestRequest::get()
        .uri("/api/v1/categories/drafts/posts")
        .insert_header(bearer(&fx.alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/categories/nowhere/posts")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn profile_owner_sees_everything_others_see_guest_subset() {
    let fx = Fixture::new().await;
    let now = Utc::now();
    fx.visible_post(&fx.alice, "public").await;
    fx.post(&fx.alice, "private", now - Duration::hours(1), false, None)
        .await;
    fx.post(&fx.alice, "scheduled", now + Duration::days(3), true, None)
        .await;
    let app = blog_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/profile/alice")
        .insert_header(bearer(&fx.alice))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["profile"]["username"], "alice");
    assert_eq!(titles(&body["posts"]), vec!["scheduled", "private", "public"]);

    let req = test::TestRequest::get()
        .uri("/api/v1/profile/alice")
        .insert_header(bearer(&fx.bob))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(titles(&body["posts"]), vec!["public"]);

    let req = test::TestRequest::get().uri("/api/v1/profile/nobody").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn pages_past_the_end_are_not_found() {
    let fx = Fixture::new().await;
    for day in 1..=12 {
        fx.post(
            &fx.bob,
            &format!("post-{day:02}"),
            Utc::now() - Duration::days(day),
            true,
            None,
        )
        .await;
    }
    let app = blog_app!(fx);

    let req = test::TestRequest::get().uri("/api/v1/posts?page=2").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(titles(&body), vec!["post-11", "post-12"]);
    assert_eq!(body["num_pages"], 2);
    assert_eq!(body["has_next"], false);
    assert_eq!(body["has_previous"], true);

    let req = test::TestRequest::get().uri("/api/v1/posts?page=3").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_bearer_token_is_rejected_on_public_routes() {
    let fx = Fixture::new().await;
    let app = blog_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", "Basic YWxpY2U6cHc="))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_post_applies_defaults_and_checks_references() {
    let fx = Fixture::new().await;
    let app = blog_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(json!({"title": "anon", "text": "nope"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&fx.alice))
        .set_json(json!({"title": "hello", "text": "world", "category_id": fx.travel.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["author"]["username"], "alice");
    assert_eq!(body["is_published"], true);
    assert_eq!(body["category"]["slug"], "travel");

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&fx.alice))
        .set_json(json!({"title": "hello", "text": "world", "category_id": uuid::Uuid::new_v4()}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(&fx.alice))
        .set_json(json!({"title": "", "text": "world"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profile_update_validates_and_detects_conflicts() {
    let fx = Fixture::new().await;
    let app = blog_app!(fx);

    let req = test::TestRequest::put()
        .uri("/api/v1/profile")
        .insert_header(bearer(&fx.alice))
        .set_json(json!({"username": "bob", "email": "alice@example.com"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::put()
        .uri("/api/v1/profile")
        .insert_header(bearer(&fx.alice))
        .set_json(json!({"username": "alice", "email": "nope"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/v1/profile")
        .insert_header(bearer(&fx.alice))
        .set_json(json!({
            "username": "alice_w",
            "first_name": "Alice",
            "last_name": "Wonder",
            "email": "alice@wonder.land"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "alice_w");
    assert_eq!(body["first_name"], "Alice");
}

#[actix_web::test]
async fn unparsable_page_is_not_found() {
    let fx = Fixture::new().await;
    let app = blog_app!(fx);

    let req = test::TestRequest::get().uri("/api/v1/posts?page=abc").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/v1/posts?page=0").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
