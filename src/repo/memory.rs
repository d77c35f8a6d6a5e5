//! In-Memory Repository Module
//!
//! In-process implementation of [`ContentRepository`] plus the write side the
//! demo routes and tests need. Stands in for the relational store; pagination
//! semantics (range filter on creation time, newest-first, id as the stable
//! tie-break) match what the feed service expects from the real thing.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::clock::now_ms;
use crate::error::Result;
use crate::repo::{AuthorScope, ContentRepository, PostRef, ViewFilter};

// == Post Record ==
/// One stored post.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: u64,
    pub author_id: u64,
    pub parent_id: Option<u64>,
    pub created_at_ms: i64,
    pub has_media: bool,
}

#[derive(Debug, Clone)]
struct NotificationRecord {
    id: u64,
    receiver_id: u64,
    created_at_ms: i64,
}

#[derive(Debug, Default)]
struct Tables {
    posts: BTreeMap<u64, PostRecord>,
    /// (follower, following) pairs
    follows: HashSet<(u64, u64)>,
    /// (user, post) pairs
    likes: HashSet<(u64, u64)>,
    /// (user, post) pairs
    bookmarks: HashSet<(u64, u64)>,
    notifications: Vec<NotificationRecord>,
    next_post_id: u64,
    next_notification_id: u64,
}

// == Memory Repository ==
/// Thread-safe in-memory content store.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
    /// Read queries served, so tests can assert the fast path skipped us.
    read_queries: AtomicU64,
}

impl MemoryRepository {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Writes ==
    /// Stores a new post and returns the full record. `created_at_ms`
    /// defaults to the current wall clock.
    pub async fn create_post(
        &self,
        author_id: u64,
        parent_id: Option<u64>,
        has_media: bool,
        created_at_ms: Option<i64>,
    ) -> PostRecord {
        let mut tables = self.tables.write().await;
        tables.next_post_id += 1;
        let record = PostRecord {
            id: tables.next_post_id,
            author_id,
            parent_id,
            created_at_ms: created_at_ms.unwrap_or_else(now_ms),
            has_media,
        };
        tables.posts.insert(record.id, record.clone());
        record
    }

    /// Removes a post, returning its record when it existed.
    pub async fn delete_post(&self, id: u64) -> Option<PostRecord> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id)
    }

    pub async fn add_follow(&self, follower_id: u64, following_id: u64) {
        let mut tables = self.tables.write().await;
        tables.follows.insert((follower_id, following_id));
    }

    pub async fn add_like(&self, user_id: u64, post_id: u64) {
        let mut tables = self.tables.write().await;
        tables.likes.insert((user_id, post_id));
    }

    pub async fn add_bookmark(&self, user_id: u64, post_id: u64) {
        let mut tables = self.tables.write().await;
        tables.bookmarks.insert((user_id, post_id));
    }

    pub async fn add_notification(&self, receiver_id: u64) -> u64 {
        let mut tables = self.tables.write().await;
        tables.next_notification_id += 1;
        let record = NotificationRecord {
            id: tables.next_notification_id,
            receiver_id,
            created_at_ms: now_ms(),
        };
        let id = record.id;
        tables.notifications.push(record);
        id
    }

    /// Number of read queries served so far.
    pub fn read_query_count(&self) -> u64 {
        self.read_queries.load(Ordering::Relaxed)
    }

    fn record_read(&self) {
        self.read_queries.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sorts newest-first with id as the stable tie-break, then cuts to `limit`.
fn page(mut refs: Vec<PostRef>, limit: usize) -> Vec<PostRef> {
    refs.sort_by(|a, b| {
        b.created_at_ms
            .cmp(&a.created_at_ms)
            .then(b.id.cmp(&a.id))
    });
    refs.truncate(limit);
    refs
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    async fn top_level_page(
        &self,
        scope: AuthorScope,
        before_ms: i64,
        limit: usize,
    ) -> Result<Vec<PostRef>> {
        self.record_read();
        let tables = self.tables.read().await;
        let refs = tables
            .posts
            .values()
            .filter(|p| p.parent_id.is_none() && p.created_at_ms <= before_ms)
            .filter(|p| match &scope {
                AuthorScope::Any => true,
                AuthorScope::Only(authors) => authors.contains(&p.author_id),
            })
            .map(|p| PostRef {
                id: p.id,
                created_at_ms: p.created_at_ms,
            })
            .collect();
        Ok(page(refs, limit))
    }

    async fn view_page(
        &self,
        view: ViewFilter,
        before_ms: i64,
        limit: usize,
    ) -> Result<Vec<PostRef>> {
        self.record_read();
        let tables = self.tables.read().await;
        let refs = match view {
            ViewFilter::Replies { author_id } => tables
                .posts
                .values()
                .filter(|p| p.author_id == author_id && p.parent_id.is_some())
                .filter(|p| p.created_at_ms <= before_ms)
                .map(|p| PostRef {
                    id: p.id,
                    created_at_ms: p.created_at_ms,
                })
                .collect(),
            ViewFilter::Liked { viewer_id } => tables
                .posts
                .values()
                .filter(|p| tables.likes.contains(&(viewer_id, p.id)))
                .filter(|p| p.created_at_ms <= before_ms)
                .map(|p| PostRef {
                    id: p.id,
                    created_at_ms: p.created_at_ms,
                })
                .collect(),
            ViewFilter::Saved { viewer_id } => tables
                .posts
                .values()
                .filter(|p| tables.bookmarks.contains(&(viewer_id, p.id)))
                .filter(|p| p.created_at_ms <= before_ms)
                .map(|p| PostRef {
                    id: p.id,
                    created_at_ms: p.created_at_ms,
                })
                .collect(),
            ViewFilter::Media { author_id } => tables
                .posts
                .values()
                .filter(|p| p.author_id == author_id && p.has_media)
                .filter(|p| p.created_at_ms <= before_ms)
                .map(|p| PostRef {
                    id: p.id,
                    created_at_ms: p.created_at_ms,
                })
                .collect(),
            ViewFilter::Notifications { receiver_id } => tables
                .notifications
                .iter()
                .filter(|n| n.receiver_id == receiver_id && n.created_at_ms <= before_ms)
                .map(|n| PostRef {
                    id: n.id,
                    created_at_ms: n.created_at_ms,
                })
                .collect(),
        };
        Ok(page(refs, limit))
    }

    async fn follower_ids(&self, author_id: u64) -> Result<Vec<u64>> {
        self.record_read();
        let tables = self.tables.read().await;
        let mut ids: Vec<u64> = tables
            .follows
            .iter()
            .filter(|(_, following)| *following == author_id)
            .map(|(follower, _)| *follower)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn following_ids(&self, user_id: u64) -> Result<Vec<u64>> {
        self.record_read();
        let tables = self.tables.read().await;
        let mut ids: Vec<u64> = tables
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, following)| *following)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_page_top_level() {
        let repo = MemoryRepository::new();
        let a = repo.create_post(1, None, false, Some(100)).await;
        let b = repo.create_post(1, None, false, Some(300)).await;
        let _reply = repo.create_post(1, Some(a.id), false, Some(400)).await;

        let refs = repo
            .top_level_page(AuthorScope::Any, i64::MAX, 10)
            .await
            .unwrap();
        assert_eq!(
            refs.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![b.id, a.id]
        );
    }

    #[tokio::test]
    async fn test_top_level_page_respects_cursor_and_limit() {
        let repo = MemoryRepository::new();
        for i in 1..=5i64 {
            repo.create_post(1, None, false, Some(i * 100)).await;
        }

        let refs = repo
            .top_level_page(AuthorScope::Any, 400, 2)
            .await
            .unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].created_at_ms, 400);
        assert_eq!(refs[1].created_at_ms, 300);
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id_desc() {
        let repo = MemoryRepository::new();
        let a = repo.create_post(1, None, false, Some(500)).await;
        let b = repo.create_post(2, None, false, Some(500)).await;

        let refs = repo
            .top_level_page(AuthorScope::Any, i64::MAX, 10)
            .await
            .unwrap();
        assert_eq!(
            refs.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![b.id, a.id]
        );
    }

    #[tokio::test]
    async fn test_author_scope_filters() {
        let repo = MemoryRepository::new();
        repo.create_post(1, None, false, Some(100)).await;
        let other = repo.create_post(2, None, false, Some(200)).await;

        let refs = repo
            .top_level_page(AuthorScope::Only(vec![2]), i64::MAX, 10)
            .await
            .unwrap();
        assert_eq!(refs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![other.id]);
    }

    #[tokio::test]
    async fn test_follow_graph_queries() {
        let repo = MemoryRepository::new();
        repo.add_follow(10, 1).await;
        repo.add_follow(11, 1).await;
        repo.add_follow(1, 10).await;

        assert_eq!(repo.follower_ids(1).await.unwrap(), vec![10, 11]);
        assert_eq!(repo.following_ids(1).await.unwrap(), vec![10]);
    }

    #[tokio::test]
    async fn test_liked_and_saved_views() {
        let repo = MemoryRepository::new();
        let a = repo.create_post(1, None, false, Some(100)).await;
        let b = repo.create_post(2, None, false, Some(200)).await;
        repo.add_like(9, a.id).await;
        repo.add_bookmark(9, b.id).await;

        let liked = repo
            .view_page(ViewFilter::Liked { viewer_id: 9 }, i64::MAX, 10)
            .await
            .unwrap();
        assert_eq!(liked.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a.id]);

        let saved = repo
            .view_page(ViewFilter::Saved { viewer_id: 9 }, i64::MAX, 10)
            .await
            .unwrap();
        assert_eq!(saved.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn test_replies_and_media_views() {
        let repo = MemoryRepository::new();
        let top = repo.create_post(1, None, true, Some(100)).await;
        let reply = repo.create_post(1, Some(top.id), false, Some(200)).await;

        let replies = repo
            .view_page(ViewFilter::Replies { author_id: 1 }, i64::MAX, 10)
            .await
            .unwrap();
        assert_eq!(replies.iter().map(|r| r.id).collect::<Vec<_>>(), vec![reply.id]);

        let media = repo
            .view_page(ViewFilter::Media { author_id: 1 }, i64::MAX, 10)
            .await
            .unwrap();
        assert_eq!(media.iter().map(|r| r.id).collect::<Vec<_>>(), vec![top.id]);
    }

    #[tokio::test]
    async fn test_delete_post_returns_record() {
        let repo = MemoryRepository::new();
        let post = repo.create_post(1, None, false, None).await;

        let deleted = repo.delete_post(post.id).await.unwrap();
        assert_eq!(deleted.id, post.id);
        assert!(repo.delete_post(post.id).await.is_none());
    }

    #[tokio::test]
    async fn test_read_query_counter() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.read_query_count(), 0);
        let _ = repo.top_level_page(AuthorScope::Any, i64::MAX, 10).await;
        let _ = repo.follower_ids(1).await;
        assert_eq!(repo.read_query_count(), 2);
    }
}
