//! Response DTOs for the feed backend API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::feed::{FeedCacheStats, FeedPage};

/// Response body for `GET /feed`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    /// Post ids, newest first
    pub posts: Vec<u64>,
    /// Cursor for the next page; absent at end of feed
    pub next_cursor: Option<i64>,
}

impl From<FeedPage> for FeedResponse {
    fn from(page: FeedPage) -> Self {
        Self {
            posts: page.posts,
            next_cursor: page.next_cursor,
        }
    }
}

/// Response body for `POST /posts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub id: u64,
    pub author_id: u64,
    pub created_at_ms: i64,
}

/// Response body for `DELETE /posts/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct DeletePostResponse {
    pub message: String,
    pub id: u64,
}

impl DeletePostResponse {
    pub fn new(id: u64) -> Self {
        Self {
            message: format!("Post {} deleted", id),
            id,
        }
    }
}

/// Response body for `POST /follows`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub message: String,
    pub follower_id: u64,
    pub following_id: u64,
}

/// Response body for the stats endpoint (`GET /stats`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub feed_cache: FeedCacheStats,
    /// Distinct timelines currently materialized
    pub timeline_keys: usize,
    /// Active rate windows
    pub rate_windows: usize,
}

/// Response body for the health endpoint (`GET /health`).
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
