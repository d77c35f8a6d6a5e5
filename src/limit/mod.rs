//! Rate Governor Module
//!
//! Fixed-window request counters keyed by `(scope, identity)`, plus the axum
//! middleware that enforces them on the request path. The governor fails
//! open: if its state is unreachable the request proceeds.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::AppState;
use crate::clock::now_ms;
use crate::config::Config;
use crate::error::FeedError;

// == Rate Scope ==
/// One independently configured limit: its own window length and threshold.
#[derive(Debug, Clone)]
pub struct RateScope {
    pub name: &'static str,
    pub window_ms: i64,
    pub max_requests: u32,
}

/// The two scopes guarding the request path.
#[derive(Debug, Clone)]
pub struct RateLimits {
    /// Overall request volume
    pub global: RateScope,
    /// Content-creation volume
    pub create: RateScope,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            global: RateScope {
                name: "global",
                window_ms: config.rate_window_ms,
                max_requests: config.rate_max_requests,
            },
            create: RateScope {
                name: "create",
                window_ms: config.create_rate_window_ms,
                max_requests: config.create_rate_max_requests,
            },
        }
    }
}

// == Decision ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_ms: i64 },
}

#[derive(Debug)]
struct Window {
    count: u32,
    expires_at: i64,
}

// == Rate Governor ==
/// Shared fixed-window counters.
#[derive(Debug, Default)]
pub struct RateGovernor {
    windows: Mutex<HashMap<(&'static str, String), Window>>,
}

impl RateGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    // == Check ==
    /// Increment-and-read for one request. The first hit of a window (or a
    /// hit on an expired window) starts a fresh window; beyond the threshold
    /// the decision carries the remaining window as the retry-after hint.
    pub fn check(&self, scope: &RateScope, identity: &str) -> RateDecision {
        let Ok(mut windows) = self.windows.lock() else {
            // Fail open rather than making the governor an outage
            return RateDecision::Allowed;
        };
        let now = now_ms();

        let window = windows
            .entry((scope.name, identity.to_string()))
            .or_insert(Window {
                count: 0,
                expires_at: now + scope.window_ms,
            });
        if window.expires_at <= now {
            window.count = 0;
            window.expires_at = now + scope.window_ms;
        }
        window.count += 1;

        if window.count > scope.max_requests {
            RateDecision::Limited {
                retry_after_ms: window.expires_at - now,
            }
        } else {
            RateDecision::Allowed
        }
    }

    // == Sweep ==
    /// Drops expired windows, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let Ok(mut windows) = self.windows.lock() else {
            return 0;
        };
        let now = now_ms();
        let before = windows.len();
        windows.retain(|_, window| window.expires_at > now);
        before - windows.len()
    }

    pub fn window_count(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }
}

// == Identity Resolution ==
/// Resolution order: authenticated user id header, network peer address,
/// first forwarded-for hop, constant fallback.
pub fn resolve_identity(request: &Request) -> String {
    if let Some(user_id) = header_value(request, "x-user-id") {
        return format!("user:{}", user_id);
    }
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    if let Some(forwarded) = header_value(request, "x-forwarded-for") {
        if let Some(first_hop) = forwarded.split(',').next() {
            let first_hop = first_hop.trim();
            if !first_hop.is_empty() {
                return first_hop.to_string();
            }
        }
    }
    "unknown".to_string()
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// == Middleware ==
/// Governs overall request volume.
pub async fn global_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, state.limits.global.clone(), request, next).await
}

/// Governs content-creation volume, layered on the write routes only.
pub async fn create_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, state.limits.create.clone(), request, next).await
}

async fn enforce(state: &AppState, scope: RateScope, request: Request, next: Next) -> Response {
    let identity = resolve_identity(&request);
    match state.governor.check(&scope, &identity) {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Limited { retry_after_ms } => {
            warn!(scope = scope.name, %identity, retry_after_ms, "Rate limit exceeded");
            FeedError::RateLimited { retry_after_ms }.into_response()
        }
    }
}
