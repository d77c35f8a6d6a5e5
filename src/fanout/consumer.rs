//! Fan-out Consumer Module
//!
//! Sole writer of timeline entries. Drains the event stream and applies each
//! content event to the author's timeline, the global timeline and follower
//! timelines. Handlers are idempotent so redelivery converges to the same
//! state, and every failure is contained: a malformed event is dropped, a
//! failed follower fan-out never unwinds the author/global writes.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::now_ms;
use crate::events::{EventStream, TOPIC_CONTENT_CREATED, TOPIC_CONTENT_DELETED};
use crate::fanout::{ContentCreated, ContentDeleted, Tombstones};
use crate::repo::ContentRepository;
use crate::timeline::{TimelineKey, TimelineStore};

// == Fan-out Consumer ==
pub struct FanoutConsumer {
    timelines: Arc<RwLock<TimelineStore>>,
    repo: Arc<dyn ContentRepository>,
    tombstones: Arc<Tombstones>,
    /// Followers per batch; one lock acquisition covers one chunk, so a
    /// high-follower author cannot hold the store for the whole fan-out
    chunk_size: usize,
}

impl FanoutConsumer {
    // == Constructor ==
    pub fn new(
        timelines: Arc<RwLock<TimelineStore>>,
        repo: Arc<dyn ContentRepository>,
        tombstones: Arc<Tombstones>,
        chunk_size: usize,
    ) -> Self {
        Self {
            timelines,
            repo,
            tombstones,
            chunk_size: chunk_size.max(1),
        }
    }

    // == Creation ==
    /// Applies one `content.created` event.
    pub async fn handle_created(&self, payload: &[u8]) {
        let event: ContentCreated = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, "Dropping malformed creation event");
                return;
            }
        };
        let Some((id, author_id)) = event.required_fields() else {
            warn!(?event, "Dropping creation event with missing fields");
            return;
        };
        if self.tombstones.contains(id) {
            info!(id, "Dropping creation event for deleted content");
            return;
        }

        let score = event.created_at_ms.unwrap_or_else(now_ms);
        let top_level = event.parent_id.is_none();
        let author_key = TimelineKey::User(author_id);

        {
            let mut store = self.timelines.write().await;
            store.upsert(&author_key, id, score);
            store.trim_to_capacity(&author_key);
            if top_level {
                store.upsert(&TimelineKey::ForYou, id, score);
                store.trim_to_capacity(&TimelineKey::ForYou);
            }
        }

        if top_level {
            self.fanout_to_followers(author_id, id, score).await;
        }
        debug!(id, author_id, top_level, "Applied creation event");
    }

    /// Upserts the post into every follower's following-timeline, in chunks.
    /// Failure is logged with the author id and leaves the author/global
    /// upserts untouched; recovery relies on event redelivery.
    async fn fanout_to_followers(&self, author_id: u64, id: u64, score: i64) {
        let followers = match self.repo.follower_ids(author_id).await {
            Ok(followers) => followers,
            Err(err) => {
                warn!(author_id, %err, "Failed to fan-out following timelines");
                return;
            }
        };
        if followers.is_empty() {
            return;
        }

        for chunk in followers.chunks(self.chunk_size) {
            let mut store = self.timelines.write().await;
            for &follower_id in chunk {
                let key = TimelineKey::Following(follower_id);
                store.upsert(&key, id, score);
                store.trim_to_capacity(&key);
            }
        }
    }

    // == Deletion ==
    /// Applies one `content.deleted` event.
    pub async fn handle_deleted(&self, payload: &[u8]) {
        let event: ContentDeleted = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, "Dropping malformed deletion event");
                return;
            }
        };
        let Some(id) = event.id else {
            warn!(?event, "Dropping deletion event with missing id");
            return;
        };

        self.tombstones.record(id);

        let mut keys = vec![TimelineKey::ForYou];
        if let Some(author_id) = event.author_id {
            keys.push(TimelineKey::User(author_id));
        }
        self.timelines.write().await.remove_from_each(&keys, id);

        if event.parent_id.is_none() {
            if let Some(author_id) = event.author_id {
                self.remove_from_followers(author_id, id).await;
            }
        }
        debug!(id, "Applied deletion event");
    }

    async fn remove_from_followers(&self, author_id: u64, id: u64) {
        let followers = match self.repo.follower_ids(author_id).await {
            Ok(followers) => followers,
            Err(err) => {
                warn!(author_id, %err, "Failed to remove post from follower timelines");
                return;
            }
        };
        if followers.is_empty() {
            return;
        }

        for chunk in followers.chunks(self.chunk_size) {
            let mut store = self.timelines.write().await;
            for &follower_id in chunk {
                store.remove(&TimelineKey::Following(follower_id), id);
            }
        }
    }
}

// == Spawn ==
/// Spawns the consumer loop. The task ends when every publisher is dropped;
/// it is aborted during graceful shutdown.
pub fn spawn_fanout_consumer(
    consumer: FanoutConsumer,
    mut stream: EventStream,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Fan-out consumer running");
        while let Some(message) = stream.recv().await {
            match message.topic {
                TOPIC_CONTENT_CREATED => consumer.handle_created(&message.payload).await,
                TOPIC_CONTENT_DELETED => consumer.handle_deleted(&message.payload).await,
                topic => warn!(topic, "Ignoring message on unknown topic"),
            }
        }
        info!("Event stream closed, fan-out consumer stopping");
    })
}
