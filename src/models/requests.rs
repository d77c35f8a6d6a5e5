//! Request DTOs for the feed backend API
//!
//! Defines the structure of incoming query strings and request bodies.
//! Field names are camelCase on the wire.

use serde::Deserialize;

use crate::feed::{FeedType, MAX_PAGE_SIZE};

/// Query string for `GET /feed`.
///
/// # Fields
/// - `feedType`: which feed to read
/// - `cursor`: only content created at or before this timestamp (ms); the
///   first page omits it
/// - `limit`: page size, clamped to 1..=100 (default 20)
/// - `viewerId`: the requesting user, required for personal feeds
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub feed_type: FeedType,
    #[serde(default)]
    pub cursor: Option<i64>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub viewer_id: Option<u64>,
}

impl FeedRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.limit == Some(0) {
            return Some("Limit must be at least 1".to_string());
        }
        if self.limit.is_some_and(|l| l > MAX_PAGE_SIZE) {
            return Some(format!("Limit exceeds maximum of {}", MAX_PAGE_SIZE));
        }
        if self.viewer_id == Some(0) {
            return Some("Viewer id must be positive".to_string());
        }
        None
    }
}

/// Body for `POST /posts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub author_id: u64,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub has_media: bool,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Option<String> {
        if self.author_id == 0 {
            return Some("Author id must be positive".to_string());
        }
        if self.parent_id == Some(0) {
            return Some("Parent id must be positive".to_string());
        }
        None
    }
}

/// Body for `POST /follows`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_id: u64,
    pub following_id: u64,
}

impl FollowRequest {
    pub fn validate(&self) -> Option<String> {
        if self.follower_id == 0 || self.following_id == 0 {
            return Some("Follower and following ids must be positive".to_string());
        }
        if self.follower_id == self.following_id {
            return Some("Cannot follow yourself".to_string());
        }
        None
    }
}
