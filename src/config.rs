//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::feed::FEED_CACHE_TTL_SECS;
use crate::timeline::MAX_TIMELINE_ENTRIES;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum members per timeline after a trim
    pub max_timeline_entries: usize,
    /// Feed result cache TTL in seconds
    pub feed_cache_ttl_secs: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval_secs: u64,
    /// Global rate window length in milliseconds
    pub rate_window_ms: i64,
    /// Maximum requests per identity per global window
    pub rate_max_requests: u32,
    /// Post-creation rate window length in milliseconds
    pub create_rate_window_ms: i64,
    /// Maximum creations per identity per window
    pub create_rate_max_requests: u32,
    /// Followers per fan-out batch
    pub fanout_chunk_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_TIMELINE_ENTRIES` - Timeline cap (default: 2000)
    /// - `FEED_CACHE_TTL` - Feed cache TTL in seconds (default: 10)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 5)
    /// - `RATE_WINDOW_MS` / `RATE_MAX` - Global rate window (default: 60000 / 300)
    /// - `CREATE_RATE_WINDOW_MS` / `CREATE_RATE_MAX` - Creation window (default: 60000 / 30)
    /// - `FANOUT_CHUNK_SIZE` - Followers per fan-out batch (default: 256)
    pub fn from_env() -> Self {
        Self {
            server_port: read_env("SERVER_PORT", 3000),
            max_timeline_entries: read_env("MAX_TIMELINE_ENTRIES", MAX_TIMELINE_ENTRIES),
            feed_cache_ttl_secs: read_env("FEED_CACHE_TTL", FEED_CACHE_TTL_SECS),
            cleanup_interval_secs: read_env("CLEANUP_INTERVAL", 5),
            rate_window_ms: read_env("RATE_WINDOW_MS", 60_000),
            rate_max_requests: read_env("RATE_MAX", 300),
            create_rate_window_ms: read_env("CREATE_RATE_WINDOW_MS", 60_000),
            create_rate_max_requests: read_env("CREATE_RATE_MAX", 30),
            fanout_chunk_size: read_env("FANOUT_CHUNK_SIZE", 256),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_timeline_entries: MAX_TIMELINE_ENTRIES,
            feed_cache_ttl_secs: FEED_CACHE_TTL_SECS,
            cleanup_interval_secs: 5,
            rate_window_ms: 60_000,
            rate_max_requests: 300,
            create_rate_window_ms: 60_000,
            create_rate_max_requests: 30,
            fanout_chunk_size: 256,
        }
    }
}

fn read_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
