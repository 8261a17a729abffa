//! Rate limiter for confirmation code resends
//!
//! Signing up with an already registered username resends a code. The limiter
//! caps how many resends a single username can trigger per time window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed per window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300, // 5 minutes
        }
    }
}

impl RateLimiterConfig {
    /// Create a new RateLimiterConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SIGNUP_RESEND_MAX`: Resends allowed per window (default: 5)
    /// - `SIGNUP_RESEND_WINDOW`: Window length in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("SIGNUP_RESEND_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            window_seconds: std::env::var("SIGNUP_RESEND_WINDOW")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.window_seconds),
        }
    }
}

/// Rate limiter entry
#[derive(Debug)]
struct RateLimiterEntry {
    /// Number of attempts in the current window
    attempts: u32,
    /// Start of the current window
    window_start: Instant,
}

/// Fixed-window rate limiter keyed by an arbitrary string
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register an attempt for `key`; `false` once the window is exhausted
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Instant::now()).await
    }

    async fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        let window = Duration::from_secs(self.config.window_seconds);
        let mut entries = self.entries.lock().await;

        // Drop windows that have already closed
        entries.retain(|_, entry| now.saturating_duration_since(entry.window_start) < window);

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            window_start: now,
        });

        if entry.attempts >= self.config.max_attempts {
            warn!(
                key,
                max_attempts = self.config.max_attempts,
                "Rate limit reached"
            );
            return false;
        }

        entry.attempts += 1;
        true
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds: 60,
        })
    }

    #[tokio::test]
    async fn allows_up_to_max_attempts() {
        let limiter = limiter(2);
        let now = Instant::now();

        assert!(limiter.is_allowed_at("alice", now).await);
        assert!(limiter.is_allowed_at("alice", now).await);
        assert!(!limiter.is_allowed_at("alice", now).await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = limiter(1);
        let now = Instant::now();

        assert!(limiter.is_allowed_at("alice", now).await);
        assert!(limiter.is_allowed_at("bob", now).await);
        assert!(!limiter.is_allowed_at("alice", now).await);
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let limiter = limiter(1);
        let now = Instant::now();

        assert!(limiter.is_allowed_at("alice", now).await);
        assert!(!limiter.is_allowed_at("alice", now + Duration::from_secs(59)).await);
        assert!(limiter.is_allowed_at("alice", now + Duration::from_secs(60)).await);
    }

    #[test]
    fn default_config() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.window_seconds, 300);
    }
}
