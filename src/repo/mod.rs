//! Repository Module
//!
//! Contract for the authoritative content store: the durable source of truth
//! the feed service falls back to when the timeline store cannot fill a page,
//! and the follower-graph source for the fan-out consumer.

mod memory;

pub use memory::{MemoryRepository, PostRecord};

use async_trait::async_trait;

use crate::error::Result;

// == Post Reference ==
/// Minimal projection of a post for feed assembly: its id and the creation
/// timestamp used as ordering score and pagination cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostRef {
    pub id: u64,
    pub created_at_ms: i64,
}

// == Author Scope ==
/// Which authors a top-level query spans.
#[derive(Debug, Clone)]
pub enum AuthorScope {
    /// All authors (the global feed)
    Any,
    /// Only the given author ids (a user's own posts, or a following set)
    Only(Vec<u64>),
}

// == View Filter ==
/// Per-viewer content views with no timeline mapping; always resolved against
/// the authoritative store.
#[derive(Debug, Clone, Copy)]
pub enum ViewFilter {
    /// Replies authored by the user
    Replies { author_id: u64 },
    /// Posts the user liked
    Liked { viewer_id: u64 },
    /// Posts the user bookmarked
    Saved { viewer_id: u64 },
    /// The author's posts carrying media
    Media { author_id: u64 },
    /// The user's notifications
    Notifications { receiver_id: u64 },
}

// == Content Repository ==
/// Authoritative content store contract.
///
/// All page queries filter by `created_at <= before_ms`, order newest-first
/// with ties broken by insertion order, and return at most `limit` rows —
/// stable, deterministic pagination.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Top-level posts (no parent) within the author scope.
    async fn top_level_page(
        &self,
        scope: AuthorScope,
        before_ms: i64,
        limit: usize,
    ) -> Result<Vec<PostRef>>;

    /// A filtered per-viewer view of content or notifications.
    async fn view_page(
        &self,
        view: ViewFilter,
        before_ms: i64,
        limit: usize,
    ) -> Result<Vec<PostRef>>;

    /// Ids of users following the given author.
    async fn follower_ids(&self, author_id: u64) -> Result<Vec<u64>>;

    /// Ids of users the given user follows.
    async fn following_ids(&self, user_id: u64) -> Result<Vec<u64>>;
}
