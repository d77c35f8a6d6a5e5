//! Timeline Module
//!
//! Bounded ordered timelines: per-key sorted sets scored by creation
//! timestamp, capped at a configurable number of entries.

mod key;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use key::TimelineKey;
pub use store::{TimelineEntry, TimelineStore};

// == Public Constants ==
/// Default cap on members per timeline
pub const MAX_TIMELINE_ENTRIES: usize = 2000;
