//! Timeline Key Module
//!
//! Identifies one denormalized timeline: the global "For You" feed, one user's
//! own posts, or one user's personalized following feed.

use std::fmt;

// == Timeline Key ==
/// Key for one bounded ordered timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimelineKey {
    /// Global top-level feed shared by all viewers
    ForYou,
    /// One author's own posts (top-level and replies)
    User(u64),
    /// One follower's materialized view of followed authors' top-level posts
    Following(u64),
}

impl fmt::Display for TimelineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineKey::ForYou => write!(f, "timeline:forYou"),
            TimelineKey::User(id) => write!(f, "timeline:user:{}", id),
            TimelineKey::Following(id) => write!(f, "timeline:following:{}", id),
        }
    }
}
