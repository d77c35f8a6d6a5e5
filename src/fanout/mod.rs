//! Fan-out Module
//!
//! Event-driven timeline maintenance: consumes content creation/deletion
//! events and materializes them into the author, global and follower
//! timelines.

mod consumer;
mod event;
mod tombstones;

// Re-export public types
pub use consumer::{spawn_fanout_consumer, FanoutConsumer};
pub use event::{ContentCreated, ContentDeleted};
pub use tombstones::{Tombstones, TOMBSTONE_TTL_MS};
