//! Feed Types Module
//!
//! The feed taxonomy and the page shape every feed read resolves to.

use serde::{Deserialize, Serialize};

use crate::timeline::TimelineKey;

// == Feed Type ==
/// Every feed a client can request. `ForYou`, `Posts` and `Following` map to
/// timelines in the fast store; the rest always resolve against the
/// authoritative store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedType {
    #[serde(rename = "For You")]
    ForYou,
    Following,
    Posts,
    Replies,
    Liked,
    Saved,
    Media,
    Notifications,
}

impl FeedType {
    /// Lowercased, space-free form used in cache keys.
    pub fn normalized(&self) -> &'static str {
        match self {
            FeedType::ForYou => "foryou",
            FeedType::Following => "following",
            FeedType::Posts => "posts",
            FeedType::Replies => "replies",
            FeedType::Liked => "liked",
            FeedType::Saved => "saved",
            FeedType::Media => "media",
            FeedType::Notifications => "notifications",
        }
    }

    /// The timeline backing this feed, when one exists. Personal feeds have
    /// no timeline without a viewer.
    pub fn timeline_key(&self, viewer_id: Option<u64>) -> Option<TimelineKey> {
        match (self, viewer_id) {
            (FeedType::ForYou, _) => Some(TimelineKey::ForYou),
            (FeedType::Posts, Some(id)) => Some(TimelineKey::User(id)),
            (FeedType::Following, Some(id)) => Some(TimelineKey::Following(id)),
            _ => None,
        }
    }
}

// == Feed Page ==
/// One page of a feed: post ids newest-first, plus the cursor for the next
/// page. `next_cursor` is absent on a short page (end of feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<u64>,
    pub next_cursor: Option<i64>,
}

impl FeedPage {
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            next_cursor: None,
        }
    }
}
