//! # Feature: Rate Limiting
//!
//! Fixed-window request counter keyed by client identifier. Each identifier
//! gets `max_requests` calls per window; the window starts at the first call
//! and the counter resets once it has passed. State lives in process memory
//! only, so every instance of a multi-instance deployment counts separately.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Fixed windows with explicit clock, background sweep with start/stop
//! - 1.1.0: Per-identifier keys instead of composite keys
//! - 1.0.0: Initial release with per-user sliding window rate limiting

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often the background sweep evicts expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        RateLimitConfig {
            max_requests,
            window: Duration::from_millis(window_ms),
        }
    }
}

impl Default for RateLimitConfig {
    /// 20 requests per minute
    fn default() -> Self {
        Self::new(20, 60 * 1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub success: bool,
    pub remaining: u32,
    pub reset_in: Duration,
}

impl RateLimitResult {
    pub fn reset_in_ms(&self) -> u64 {
        self.reset_in.as_millis() as u64
    }
}

#[derive(Default)]
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and count a request against the wall clock.
    pub fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult {
        self.check_at(identifier, config, Utc::now())
    }

    /// Check and count a request at `now`.
    ///
    /// The read-check-increment runs while holding the entry's shard lock, so
    /// concurrent callers for one identifier never push `count` past
    /// `max_requests`. A rejected request leaves the entry untouched.
    pub fn check_at(
        &self,
        identifier: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> RateLimitResult {
        if config.max_requests == 0 {
            return RateLimitResult {
                success: false,
                remaining: 0,
                reset_in: config.window,
            };
        }

        let fresh = RateLimitEntry {
            count: 1,
            reset_time: window_end(now, config.window),
        };
        let first = RateLimitResult {
            success: true,
            remaining: config.max_requests - 1,
            reset_in: config.window,
        };

        match self.entries.entry(identifier.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                first
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.reset_time < now {
                    *entry = fresh;
                    return first;
                }

                let reset_in = until(now, entry.reset_time);
                if entry.count < config.max_requests {
                    entry.count += 1;
                    RateLimitResult {
                        success: true,
                        remaining: config.max_requests.saturating_sub(entry.count),
                        reset_in,
                    }
                } else {
                    debug!(
                        "Rate limit exceeded for {identifier} (resets in {}ms)",
                        reset_in.as_millis()
                    );
                    RateLimitResult {
                        success: false,
                        remaining: 0,
                        reset_in,
                    }
                }
            }
        }
    }

    /// Remove entries whose window ended before `now`. Returns how many went.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.reset_time >= now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn entry(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.entries.get(identifier).map(|e| *e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn the periodic sweep on the current tokio runtime. A sweep that is
    /// already running is left alone.
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(|p| p.into_inner());
        if sweeper.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("Rate limit sweep already running");
            return;
        }

        // Weak so a dropped limiter also ends its sweep
        let limiter = Arc::downgrade(self);
        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let removed = limiter.purge_expired(Utc::now());
                if removed > 0 {
                    debug!(
                        "Rate limit sweep removed {removed} expired entries ({} remain)",
                        limiter.len()
                    );
                }
            }
        }));

        info!(
            "Rate limit sweep started (interval: {}s)",
            interval.as_secs()
        );
    }

    pub fn stop(&self) {
        let handle = self.sweeper.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = handle {
            handle.abort();
            info!("Rate limit sweep stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        let slot = self.sweeper.get_mut().unwrap_or_else(|p| p.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

fn window_end(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|w| now.checked_add_signed(w))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn until(now: DateTime<Utc>, later: DateTime<Utc>) -> Duration {
    (later - now).to_std().unwrap_or(Duration::ZERO)
}
