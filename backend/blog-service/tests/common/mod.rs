#![allow(dead_code)]

/// Shared fixtures for blog-service integration tests.
use blog_service::db::{BlogStore, InMemoryBlogStore, PostRepository};
use blog_service::handlers::BlogState;
use blog_service::models::{Category, Identity, Post, PostDraft, User, Viewer};
use chrono::{DateTime, Duration, Utc};
use crypto_core::jwt;
use std::sync::{Arc, Once};

const TEST_PRIVATE_KEY: &str =
    include_str!("../../../libs/crypto-core/tests/fixtures/test_private_key.pem");
const TEST_PUBLIC_KEY: &str =
    include_str!("../../../libs/crypto-core/tests/fixtures/test_public_key.pem");

static INIT: Once = Once::new();

pub fn init_keys() {
    INIT.call_once(|| {
        jwt::initialize_jwt_keys(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY)
            .expect("Failed to initialize test keys");
    });
}

pub const PAGE_SIZE: i64 = 10;

/// Two users and two categories (one published, one hidden) in a fresh store.
pub struct Fixture {
    pub store: Arc<InMemoryBlogStore>,
    pub alice: User,
    pub bob: User,
    pub travel: Category,
    pub drafts: Category,
}

impl Fixture {
    pub async fn new() -> Self {
        init_keys();

        let store = Arc::new(InMemoryBlogStore::new());
        let alice = store.add_user("alice").await;
        let bob = store.add_user("bob").await;
        let travel = store.add_category("Travel", "travel", true).await;
        let drafts = store.add_category("Drafts", "drafts", false).await;

        Self {
            store,
            alice,
            bob,
            travel,
            drafts,
        }
    }

    pub fn blog_store(&self) -> Arc<dyn BlogStore> {
        self.store.clone()
    }

    pub fn state(&self) -> BlogState {
        BlogState::new(self.blog_store(), PAGE_SIZE)
    }

    pub async fn post(
        &self,
        author: &User,
        title: &str,
        pub_date: DateTime<Utc>,
        is_published: bool,
        category: Option<&Category>,
    ) -> Post {
        let draft = PostDraft {
            title: title.to_string(),
            text: format!("{} text", title),
            pub_date,
            is_published,
            category_id: category.map(|c| c.id),
            location_id: None,
            image: None,
        };
        self.store
            .insert_post(author.id, &draft)
            .await
            .expect("Failed to insert post")
    }

    /// Published, dated yesterday, no category.
    pub async fn visible_post(&self, author: &User, title: &str) -> Post {
        self.post(author, title, Utc::now() - Duration::days(1), true, None)
            .await
    }
}

pub fn identity(user: &User) -> Identity {
    Identity {
        id: user.id,
        username: user.username.clone(),
    }
}

pub fn viewer(user: &User) -> Viewer {
    Viewer::from(identity(user))
}

pub fn bearer(user: &User) -> (&'static str, String) {
    init_keys();
    let token = jwt::generate_access_token(user.id, &user.username).expect("token");
    ("Authorization", format!("Bearer {}", token))
}

/// Build the blog app around a fixture's store.
#[macro_export]
macro_rules! blog_app {
    ($fixture:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($fixture.state()))
                .configure(blog_service::handlers::configure),
        )
        .await
    };
}
