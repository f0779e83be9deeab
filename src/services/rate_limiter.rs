// src/services/rate_limiter.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    net::IpAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window request counter keyed by client address.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RwLock<HashMap<IpAddr, Window>>>,
    max_requests: u32,
    window: Duration,
}

impl Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish()
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count one request from `ip` and decide whether it may proceed.
    pub async fn check(&self, ip: IpAddr) -> RateDecision {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> RateDecision {
        let mut guard = self.inner.write().await;
        let entry = guard.entry(ip).or_insert_with(|| Window { started: now, hits: 0 });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.hits = 0;
        }

        if entry.hits >= self.max_requests {
            let elapsed = now.duration_since(entry.started);
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        entry.hits += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - entry.hits,
        }
    }

    /// Drop windows that have expired. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, w| now.duration_since(w.started) < self.window);
        before - guard.len()
    }

    /// Number of tracked clients
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
