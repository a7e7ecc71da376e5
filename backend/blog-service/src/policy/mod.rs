/// Visibility and ownership policy
///
/// Every read path (index, detail, category, profile) and every write path
/// (post and comment mutation) goes through this module. All functions are
/// pure: the evaluation instant is passed in, records are read by the caller.
///
/// - `visibility`: which posts (and therefore comments) a viewer may read
/// - `ownership`: who may mutate a post or comment, and how denials surface
pub mod ownership;
pub mod visibility;

pub use ownership::{
    authorize_comment_change, authorize_post_change, can_modify, post_detail_url, Authored,
};
pub use visibility::{
    filter_visible, is_visible_to, is_visible_to_guest, resolve_category_feed, resolve_index_feed,
    resolve_post_detail, resolve_profile_feed, PostScope, Visibility,
};
