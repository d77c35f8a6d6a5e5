//! Request and Response models for the feed backend API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CreatePostRequest, FeedRequest, FollowRequest};
pub use responses::{
    CreatePostResponse, DeletePostResponse, FeedResponse, FollowResponse, HealthResponse,
    StatsResponse,
};
