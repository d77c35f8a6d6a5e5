//! Feed Service Module
//!
//! Assembles feed pages: result cache first, then the timeline store fast
//! path, then the authoritative store as fallback or merge partner.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::feed::{FeedCache, FeedPage, FeedType};
use crate::repo::{AuthorScope, ContentRepository, PostRef, ViewFilter};
use crate::timeline::{TimelineKey, TimelineStore};

// == Feed Query ==
/// One resolved feed request.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub feed_type: FeedType,
    /// Only content created at or before this timestamp is returned
    pub cursor_ms: i64,
    pub limit: usize,
    pub viewer_id: Option<u64>,
}

impl FeedQuery {
    fn cache_key(&self) -> String {
        let viewer = self
            .viewer_id
            .map_or_else(|| "public".to_string(), |id| id.to_string());
        format!(
            "feed:{}:{}:{}:{}",
            self.feed_type.normalized(),
            viewer,
            self.cursor_ms,
            self.limit
        )
    }
}

// == Feed Service ==
/// Read path of the feed subsystem. Sole writer of the feed cache; reads the
/// timeline store and the authoritative repository, never writes either.
pub struct FeedService {
    timelines: Arc<RwLock<TimelineStore>>,
    cache: Arc<RwLock<FeedCache>>,
    repo: Arc<dyn ContentRepository>,
}

impl FeedService {
    // == Constructor ==
    pub fn new(
        timelines: Arc<RwLock<TimelineStore>>,
        cache: Arc<RwLock<FeedCache>>,
        repo: Arc<dyn ContentRepository>,
    ) -> Self {
        Self {
            timelines,
            cache,
            repo,
        }
    }

    // == Fetch Page ==
    /// Returns one feed page, served from the result cache when fresh.
    /// Cached pages are returned verbatim; up to the cache TTL of staleness
    /// is accepted.
    pub async fn fetch_page(&self, query: &FeedQuery) -> Result<FeedPage> {
        let key = query.cache_key();

        if let Some(page) = self.cache.write().await.get(&key) {
            debug!(%key, "feed cache hit");
            return Ok(page);
        }

        let page = self.build_feed(query).await?;

        self.cache.write().await.set(key, page.clone());
        Ok(page)
    }

    // == Build Feed ==
    /// Timeline fast path when the feed maps to a timeline and the timeline
    /// can fill the page; merge with the authoritative store when it cannot;
    /// authoritative store alone otherwise.
    async fn build_feed(&self, query: &FeedQuery) -> Result<FeedPage> {
        if let Some(timeline_key) = query.feed_type.timeline_key(query.viewer_id) {
            if let Some(timeline_page) = self.timeline_page(&timeline_key, query).await {
                if timeline_page.posts.len() >= query.limit {
                    return Ok(timeline_page);
                }

                let db_page = self.resolve_authoritative(query).await?;
                if db_page.posts.is_empty() {
                    return Ok(timeline_page);
                }

                return Ok(merge_pages(timeline_page, db_page, query.limit));
            }
        }

        self.resolve_authoritative(query).await
    }

    /// Reads one page from the timeline store; `None` when the timeline has
    /// nothing at or below the cursor.
    async fn timeline_page(&self, key: &TimelineKey, query: &FeedQuery) -> Option<FeedPage> {
        let store = self.timelines.read().await;
        let entries = store.range_desc(key, query.cursor_ms, query.limit);
        if entries.is_empty() {
            return None;
        }

        let next_cursor = if entries.len() == query.limit {
            entries.last().map(|e| e.score)
        } else {
            None
        };
        Some(FeedPage {
            posts: entries.iter().map(|e| e.id).collect(),
            next_cursor,
        })
    }

    /// Resolves the page against the authoritative store. Personal feeds
    /// requested without a viewer resolve to an empty page.
    async fn resolve_authoritative(&self, query: &FeedQuery) -> Result<FeedPage> {
        let FeedQuery {
            feed_type,
            cursor_ms,
            limit,
            viewer_id,
        } = query.clone();

        let refs = match (feed_type, viewer_id) {
            (FeedType::ForYou, _) => {
                self.repo
                    .top_level_page(AuthorScope::Any, cursor_ms, limit)
                    .await?
            }
            (FeedType::Following, Some(viewer)) => {
                let authors = self.repo.following_ids(viewer).await?;
                if authors.is_empty() {
                    Vec::new()
                } else {
                    self.repo
                        .top_level_page(AuthorScope::Only(authors), cursor_ms, limit)
                        .await?
                }
            }
            (FeedType::Posts, Some(viewer)) => {
                self.repo
                    .top_level_page(AuthorScope::Only(vec![viewer]), cursor_ms, limit)
                    .await?
            }
            (FeedType::Replies, Some(viewer)) => {
                self.repo
                    .view_page(ViewFilter::Replies { author_id: viewer }, cursor_ms, limit)
                    .await?
            }
            (FeedType::Liked, Some(viewer)) => {
                self.repo
                    .view_page(ViewFilter::Liked { viewer_id: viewer }, cursor_ms, limit)
                    .await?
            }
            (FeedType::Saved, Some(viewer)) => {
                self.repo
                    .view_page(ViewFilter::Saved { viewer_id: viewer }, cursor_ms, limit)
                    .await?
            }
            (FeedType::Media, Some(viewer)) => {
                self.repo
                    .view_page(ViewFilter::Media { author_id: viewer }, cursor_ms, limit)
                    .await?
            }
            (FeedType::Notifications, Some(viewer)) => {
                self.repo
                    .view_page(
                        ViewFilter::Notifications {
                            receiver_id: viewer,
                        },
                        cursor_ms,
                        limit,
                    )
                    .await?
            }
            (_, None) => {
                warn!(?feed_type, "personal feed requested without a viewer");
                Vec::new()
            }
        };

        Ok(page_from_refs(refs, limit))
    }
}

/// Converts an authoritative result set into a page. `next_cursor` is set
/// only on a full page.
fn page_from_refs(refs: Vec<PostRef>, limit: usize) -> FeedPage {
    let next_cursor = if refs.len() == limit {
        refs.last().map(|r| r.created_at_ms)
    } else {
        None
    };
    FeedPage {
        posts: refs.into_iter().map(|r| r.id).collect(),
        next_cursor,
    }
}

/// Merges a short timeline page with an authoritative page: timeline ids keep
/// their order, authoritative ids are appended if unseen, capped at `limit`.
/// The authoritative cursor wins when authoritative entries were used.
fn merge_pages(timeline: FeedPage, db: FeedPage, limit: usize) -> FeedPage {
    let mut posts = timeline.posts.clone();
    let mut seen: HashSet<u64> = posts.iter().copied().collect();

    for id in db.posts {
        if seen.insert(id) {
            posts.push(id);
        }
        if posts.len() == limit {
            break;
        }
    }

    let used_db_posts = posts.len() > timeline.posts.len();
    let next_cursor = if used_db_posts && db.next_cursor.is_some() {
        db.next_cursor
    } else {
        timeline.next_cursor.or(db.next_cursor)
    };

    FeedPage { posts, next_cursor }
}
