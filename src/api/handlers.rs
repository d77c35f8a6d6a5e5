//! API Handlers
//!
//! HTTP request handlers for each feed backend endpoint. Handlers never write
//! timelines directly: the write path only persists to the repository and
//! publishes an event for the fan-out consumer.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tokio::sync::RwLock;

use crate::clock::now_ms;
use crate::config::Config;
use crate::error::{FeedError, Result};
use crate::events::{
    event_bus, EventPublisher, EventStream, TOPIC_CONTENT_CREATED, TOPIC_CONTENT_DELETED,
};
use crate::fanout::{ContentCreated, ContentDeleted, Tombstones};
use crate::feed::{FeedCache, FeedQuery, FeedService, CURSOR_SKEW_MS, DEFAULT_PAGE_SIZE};
use crate::limit::{RateGovernor, RateLimits};
use crate::models::{
    CreatePostRequest, CreatePostResponse, DeletePostResponse, FeedRequest, FeedResponse,
    FollowRequest, FollowResponse, HealthResponse, StatsResponse,
};
use crate::repo::MemoryRepository;
use crate::timeline::TimelineStore;

/// Application state shared across all handlers.
///
/// Every collaborator is constructed once in the composition root and
/// injected here; nothing is lazily initialized on first use.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedService>,
    pub repo: Arc<MemoryRepository>,
    pub timelines: Arc<RwLock<TimelineStore>>,
    pub cache: Arc<RwLock<FeedCache>>,
    pub publisher: EventPublisher,
    pub governor: Arc<RateGovernor>,
    pub limits: RateLimits,
    pub tombstones: Arc<Tombstones>,
}

impl AppState {
    /// Builds the full object graph from configuration, returning the state
    /// and the event stream the fan-out consumer must drain.
    pub fn from_config(config: &Config) -> (Self, EventStream) {
        let timelines = Arc::new(RwLock::new(TimelineStore::new(config.max_timeline_entries)));
        let cache = Arc::new(RwLock::new(FeedCache::new(config.feed_cache_ttl_secs)));
        let repo = Arc::new(MemoryRepository::new());
        let feed = Arc::new(FeedService::new(
            timelines.clone(),
            cache.clone(),
            repo.clone(),
        ));
        let (publisher, stream) = event_bus();

        let state = Self {
            feed,
            repo,
            timelines,
            cache,
            publisher,
            governor: Arc::new(RateGovernor::new()),
            limits: RateLimits::from_config(config),
            tombstones: Arc::new(Tombstones::default()),
        };
        (state, stream)
    }
}

/// Handler for GET /feed
///
/// Returns one page of post ids for the requested feed. A missing cursor
/// means "first page": now plus a small skew so just-created content is
/// included.
pub async fn feed_handler(
    State(state): State<AppState>,
    Query(req): Query<FeedRequest>,
) -> Result<Json<FeedResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(FeedError::InvalidRequest(error_msg));
    }

    let query = FeedQuery {
        feed_type: req.feed_type,
        cursor_ms: req.cursor.unwrap_or_else(|| now_ms() + CURSOR_SKEW_MS),
        limit: req.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        viewer_id: req.viewer_id,
    };

    let page = state.feed.fetch_page(&query).await?;
    Ok(Json(FeedResponse::from(page)))
}

/// Handler for POST /posts
///
/// Persists the post and publishes `content.created`; the fan-out consumer
/// picks it up asynchronously.
pub async fn create_post_handler(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<CreatePostResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(FeedError::InvalidRequest(error_msg));
    }

    let record = state
        .repo
        .create_post(req.author_id, req.parent_id, req.has_media, None)
        .await;

    state.publisher.publish(
        TOPIC_CONTENT_CREATED,
        &ContentCreated::new(
            record.id,
            record.author_id,
            record.parent_id,
            record.created_at_ms,
        ),
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            id: record.id,
            author_id: record.author_id,
            created_at_ms: record.created_at_ms,
        }),
    ))
}

/// Handler for DELETE /posts/:id
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeletePostResponse>> {
    let record = state
        .repo
        .delete_post(id)
        .await
        .ok_or_else(|| FeedError::NotFound(format!("Post {}", id)))?;

    state.publisher.publish(
        TOPIC_CONTENT_DELETED,
        &ContentDeleted::new(record.id, Some(record.author_id), record.parent_id),
    );

    Ok(Json(DeletePostResponse::new(id)))
}

/// Handler for POST /follows
pub async fn follow_handler(
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> Result<Json<FollowResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(FeedError::InvalidRequest(error_msg));
    }

    state.repo.add_follow(req.follower_id, req.following_id).await;

    Ok(Json(FollowResponse {
        message: format!("User {} follows user {}", req.follower_id, req.following_id),
        follower_id: req.follower_id,
        following_id: req.following_id,
    }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let feed_cache = state.cache.read().await.stats();
    let timeline_keys = state.timelines.read().await.key_count();

    Json(StatsResponse {
        feed_cache,
        timeline_keys,
        rate_windows: state.governor.window_count(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::{spawn_fanout_consumer, FanoutConsumer};
    use crate::feed::FeedType;

    fn test_state() -> (AppState, EventStream) {
        AppState::from_config(&Config::default())
    }

    #[tokio::test]
    async fn test_create_post_persists_and_publishes() {
        let (state, mut stream) = test_state();

        let req = CreatePostRequest {
            author_id: 1,
            parent_id: None,
            has_media: false,
        };
        let (status, response) = create_post_handler(State(state.clone()), Json(req))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.author_id, 1);

        let message = stream.recv().await.unwrap();
        assert_eq!(message.topic, TOPIC_CONTENT_CREATED);
    }

    #[tokio::test]
    async fn test_create_post_rejects_zero_author() {
        let (state, _stream) = test_state();

        let req = CreatePostRequest {
            author_id: 0,
            parent_id: None,
            has_media: false,
        };
        let result = create_post_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(FeedError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_post_is_not_found() {
        let (state, _stream) = test_state();

        let result = delete_post_handler(State(state), Path(999)).await;
        assert!(matches!(result, Err(FeedError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_feed_handler_end_to_end_with_consumer() {
        let (state, stream) = test_state();
        let consumer = FanoutConsumer::new(
            state.timelines.clone(),
            state.repo.clone(),
            state.tombstones.clone(),
            256,
        );
        let handle = spawn_fanout_consumer(consumer, stream);

        let req = CreatePostRequest {
            author_id: 1,
            parent_id: None,
            has_media: false,
        };
        create_post_handler(State(state.clone()), Json(req))
            .await
            .unwrap();

        // Wait for the consumer to apply the event
        for _ in 0..100 {
            if state.timelines.read().await.key_count() > 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let response = feed_handler(
            State(state.clone()),
            Query(FeedRequest {
                feed_type: FeedType::ForYou,
                cursor: None,
                limit: Some(10),
                viewer_id: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.posts.len(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_stats_handler_reports_cache_counters() {
        let (state, _stream) = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.feed_cache.hits, 0);
        assert_eq!(response.timeline_keys, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
