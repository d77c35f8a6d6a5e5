//! Feed Module
//!
//! Feed assembly: resolves a feed type, cursor and page size into a page of
//! post ids, combining the timeline store fast path with the authoritative
//! store and a short-lived result cache.

mod cache;
mod service;
mod types;

// Re-export public types
pub use cache::{FeedCache, FeedCacheStats};
pub use service::{FeedQuery, FeedService};
pub use types::{FeedPage, FeedType};

// == Public Constants ==
/// Feed result cache TTL in seconds
pub const FEED_CACHE_TTL_SECS: u64 = 10;

/// Skew added to "now" for a first-page cursor so just-created content is
/// included
pub const CURSOR_SKEW_MS: i64 = 5_000;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when the client does not specify one
pub const DEFAULT_PAGE_SIZE: usize = 20;
