//! Feedline - A social feed backend core
//!
//! Maintains denormalized, bounded, time-ordered timelines through an
//! event-driven fan-out consumer, assembles paginated feed pages by merging
//! the fast timeline store with an authoritative content store, and governs
//! request rates with fixed-window counters.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod fanout;
pub mod feed;
pub mod limit;
pub mod models;
pub mod repo;
pub mod tasks;
pub mod timeline;

pub use api::AppState;
pub use config::Config;
pub use fanout::{spawn_fanout_consumer, FanoutConsumer};
pub use tasks::spawn_cleanup_task;
