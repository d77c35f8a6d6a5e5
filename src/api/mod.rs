//! API Module
//!
//! HTTP handlers and routing for the feed backend REST API.
//!
//! # Endpoints
//! - `GET /feed` - Read one feed page
//! - `POST /posts` - Create a post
//! - `DELETE /posts/:id` - Delete a post
//! - `POST /follows` - Follow a user
//! - `GET /stats` - Cache and timeline statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
