//! API Routes
//!
//! Configures the Axum router with all feed backend endpoints.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_post_handler, delete_post_handler, feed_handler, follow_handler, health_handler,
    stats_handler, AppState,
};
use crate::limit::{create_rate_limit, global_rate_limit};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /feed` - Read one feed page
/// - `POST /posts` - Create a post (publishes `content.created`)
/// - `DELETE /posts/:id` - Delete a post (publishes `content.deleted`)
/// - `POST /follows` - Follow a user
/// - `GET /stats` - Cache and timeline statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
/// - Rate governor: global scope on every route, creation scope on POST /posts
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route(
            "/posts",
            post(create_post_handler).route_layer(middleware::from_fn_with_state(
                state.clone(),
                create_rate_limit,
            )),
        )
        .route("/feed", get(feed_handler))
        .route("/posts/:id", delete(delete_post_handler))
        .route("/follows", post(follow_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            global_rate_limit,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let (state, _stream) = AppState::from_config(&Config::default());
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_feed_endpoint_for_you() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/feed?feedType=For%20You&limit=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_feed_endpoint_rejects_bad_type() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/feed?feedType=Nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_post_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/posts")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"authorId": 1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_delete_unknown_post_returns_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/posts/12345")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
