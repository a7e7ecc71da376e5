/// Data models for blog-service
///
/// This module defines structures for:
/// - Post: Blog publications with optional category and location
/// - Category / Location: Administrative groupings with their own publication flag
/// - Comment: Comments on posts
/// - User: Public profile data
/// - Viewer: The identity a request is evaluated for
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const TITLE_MAX_LEN: u64 = 256;

/// Publication flag plus creation timestamp, shared by every publishable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Publication {
    pub fn published_at(created_at: DateTime<Utc>) -> Self {
        Self {
            is_published: true,
            created_at,
        }
    }

    pub fn hidden_at(created_at: DateTime<Utc>) -> Self {
        Self {
            is_published: false,
            created_at,
        }
    }
}

/// Owner reference embedded in posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(flatten)]
    pub publication: Publication,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub publication: Publication,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    /// Posts dated in the future are deferred publications.
    pub pub_date: DateTime<Utc>,
    pub author: Author,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub image: Option<String>,
    #[serde(flatten)]
    pub publication: Publication,
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Authenticated identity taken from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
}

/// Who a request is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Guest,
    User(Identity),
}

impl Viewer {
    pub fn user(id: Uuid, username: impl Into<String>) -> Self {
        Viewer::User(Identity {
            id,
            username: username.into(),
        })
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Guest => None,
            Viewer::User(identity) => Some(identity.id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::User(_))
    }

    /// True when this viewer is the authenticated user `user_id`. Guests never match.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id() == Some(user_id)
    }
}

impl From<Identity> for Viewer {
    fn from(identity: Identity) -> Self {
        Viewer::User(identity)
    }
}

/// Create/update payload for a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, max = TITLE_MAX_LEN))]
    pub title: String,
    #[validate(length(min = 1))]
    pub text: String,
    /// Defaults to the time of the request when omitted.
    pub pub_date: Option<DateTime<Utc>>,
    /// Defaults to published on create and to the stored flag on update.
    pub is_published: Option<bool>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
}

/// Post fields as written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Post detail with its comments, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryFeed {
    pub category: Category,
    pub posts: Page<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub profile: User,
    pub posts: Page<Post>,
}
