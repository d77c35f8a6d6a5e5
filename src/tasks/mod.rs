//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cleanup: sweeps expired feed-cache pages, rate windows and tombstones

mod cleanup;

pub use cleanup::spawn_cleanup_task;
