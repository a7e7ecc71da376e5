/// Business logic layer for blog-service
///
/// This module provides high-level operations:
/// - Post service: detail, create, edit, delete
/// - Comment service: add, edit, delete
/// - Feed service: index, category and profile listings
/// - Profile service: profile edits
///
/// Every operation consults the policy module and never reads storage
/// without a viewer.
pub mod comments;
pub mod feeds;
pub mod pagination;
pub mod posts;
pub mod profiles;

pub use comments::CommentService;
pub use feeds::FeedService;
pub use pagination::Paginator;
pub use posts::PostService;
pub use profiles::ProfileService;
