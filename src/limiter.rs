// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for submission ingress.
//!
//! One window per caller key (forwarded IP, or `"unknown"`). A window
//! opens on the first request from a key and lasts a configured
//! duration; requests past the per-window maximum are rejected until
//! the window expires. The counter keeps incrementing on rejected
//! requests, so a caller cannot probe the limit down inside a window.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window expires
        retry_after: Duration,
    },
}

/// Per-caller window state.
#[derive(Debug)]
struct RateRecord {
    /// Requests seen in the current window, rejected ones included
    count: u32,
    /// When the current window opened
    window_start: Instant,
}

/// Thread-safe fixed-window rate limiter.
///
/// The check-then-update sequence on a caller's record is a critical
/// section: it runs entirely under the write lock, so two simultaneous
/// requests from one caller cannot both observe a pre-increment count.
pub struct RateLimiter {
    config: RateLimitConfig,
    records: Arc<RwLock<HashMap<String, RateRecord>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check and count a request for the given caller key.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now()).await
    }

    /// Check at an explicit instant. Window arithmetic is relative to
    /// `now`, which tests pin to synthetic times.
    async fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let window = self.config.window_duration();
        let mut records = self.records.write().await;

        let record = records.entry(key.to_string()).or_insert_with(|| RateRecord {
            count: 0,
            window_start: now,
        });

        if now.duration_since(record.window_start) > window {
            record.count = 0;
            record.window_start = now;
        }

        record.count += 1;
        let elapsed = now.duration_since(record.window_start);

        if record.count > self.config.max_requests {
            let retry_after = window.saturating_sub(elapsed);
            debug!(key, count = record.count, ?retry_after, "rate limit exceeded");
            RateLimitResult::Limited { retry_after }
        } else {
            RateLimitResult::Allowed {
                remaining: self.config.max_requests - record.count,
                reset_in: window.saturating_sub(elapsed),
            }
        }
    }

    /// Evict records whose window has fully elapsed (should be called
    /// periodically). A surviving record would have been reset by the
    /// next check anyway, so eviction never changes limiting behavior.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let window = self.config.window_duration();

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| now.duration_since(record.window_start) <= window);
        let evicted = before - records.len();
        if evicted > 0 {
            debug!(evicted, remaining = records.len(), "evicted expired rate windows");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window_secs,
        })
    }

    #[tokio::test]
    async fn test_allows_up_to_max_then_limits() {
        let limiter = limiter(5, 900);
        let now = Instant::now();

        for i in 0..5 {
            match limiter.check_at("203.0.113.7", now).await {
                RateLimitResult::Allowed { remaining, .. } => {
                    assert_eq!(remaining, 4 - i);
                }
                RateLimitResult::Limited { .. } => panic!("request {} should be allowed", i + 1),
            }
        }

        // 6th request in the same window is rejected
        match limiter.check_at("203.0.113.7", now).await {
            RateLimitResult::Limited { retry_after } => {
                assert!(retry_after <= Duration::from_secs(900));
            }
            RateLimitResult::Allowed { .. } => panic!("6th request should be limited"),
        }
    }

    #[tokio::test]
    async fn test_window_expiry_resets_count() {
        let limiter = limiter(5, 900);
        let start = Instant::now();

        for _ in 0..6 {
            limiter.check_at("203.0.113.7", start).await;
        }
        assert!(matches!(
            limiter.check_at("203.0.113.7", start).await,
            RateLimitResult::Limited { .. }
        ));

        // Past the window the caller gets a fresh allowance
        let later = start + Duration::from_secs(901);
        match limiter.check_at("203.0.113.7", later).await {
            RateLimitResult::Allowed { remaining, .. } => assert_eq!(remaining, 4),
            RateLimitResult::Limited { .. } => panic!("fresh window should admit"),
        }
    }

    #[tokio::test]
    async fn test_rejections_keep_counting() {
        let limiter = limiter(2, 900);
        let now = Instant::now();

        for _ in 0..10 {
            limiter.check_at("unknown", now).await;
        }

        // Still inside the window, still rejected
        assert!(matches!(
            limiter.check_at("unknown", now).await,
            RateLimitResult::Limited { .. }
        ));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1, 900);
        let now = Instant::now();

        assert!(matches!(
            limiter.check_at("10.0.0.1", now).await,
            RateLimitResult::Allowed { .. }
        ));
        assert!(matches!(
            limiter.check_at("10.0.0.1", now).await,
            RateLimitResult::Limited { .. }
        ));
        assert!(matches!(
            limiter.check_at("10.0.0.2", now).await,
            RateLimitResult::Allowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_cleanup_drops_only_expired_windows() {
        let limiter = limiter(5, 1);

        limiter.check("stale").await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        limiter.check("fresh").await;

        limiter.cleanup().await;

        let records = limiter.records.read().await;
        assert!(!records.contains_key("stale"));
        assert!(records.contains_key("fresh"));
    }
}
