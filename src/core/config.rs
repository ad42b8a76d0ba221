//! # Configuration
//!
//! Environment-driven settings for the notifier process. Values are read once
//! at startup (after `dotenvy` has loaded any `.env` file).
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Default location moved here from the scheduler
//! - 1.1.0: Dispatch interval and warning offset are configurable
//! - 1.0.0: Initial release with rate limit settings

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::features::notifications::{Madhab, NotificationSettings};
use crate::features::rate_limiting::RateLimitConfig;

/// Dhaka, used when the caller has no stored location.
pub const DEFAULT_LATITUDE: f64 = 23.8103;
pub const DEFAULT_LONGITUDE: f64 = 90.4125;
pub const DEFAULT_TIMEZONE: &str = "Asia/Dhaka";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,

    // Rate limiting
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
    pub rate_limit_sweep_secs: u64,

    // Notifications
    pub notification_warning_minutes: i64,
    pub dispatch_interval_secs: u64,
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_timezone: String,
    pub default_madhab: Madhab,
    pub prayer_start: bool,
    pub prayer_ending: bool,
    pub dua_reminders: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Config {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rate_limit_max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", 20)?,
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", 60_000)?,
            rate_limit_sweep_secs: env_or("RATE_LIMIT_SWEEP_SECS", 300)?,
            notification_warning_minutes: env_or("NOTIFICATION_WARNING_MINUTES", 20)?,
            dispatch_interval_secs: env_or("DISPATCH_INTERVAL_SECS", 30)?,
            default_latitude: env_or("DEFAULT_LATITUDE", DEFAULT_LATITUDE)?,
            default_longitude: env_or("DEFAULT_LONGITUDE", DEFAULT_LONGITUDE)?,
            default_timezone: env::var("DEFAULT_TIMEZONE")
                .unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string()),
            default_madhab: env_or("DEFAULT_MADHAB", Madhab::Hanafi)?,
            prayer_start: env_or("NOTIFY_PRAYER_START", true)?,
            prayer_ending: env_or("NOTIFY_PRAYER_ENDING", true)?,
            dua_reminders: env_or("NOTIFY_DUA_REMINDERS", true)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_window_ms == 0 {
            return Err(anyhow::anyhow!("RATE_LIMIT_WINDOW_MS must be greater than 0"));
        }
        if self.rate_limit_sweep_secs == 0 {
            return Err(anyhow::anyhow!("RATE_LIMIT_SWEEP_SECS must be greater than 0"));
        }
        if self.dispatch_interval_secs == 0 {
            return Err(anyhow::anyhow!("DISPATCH_INTERVAL_SECS must be greater than 0"));
        }
        if self.notification_warning_minutes < 0 {
            return Err(anyhow::anyhow!(
                "NOTIFICATION_WARNING_MINUTES must not be negative"
            ));
        }
        Ok(())
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max_requests,
            window: Duration::from_millis(self.rate_limit_window_ms),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_secs)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_secs(self.dispatch_interval_secs)
    }

    pub fn warning_offset(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.notification_warning_minutes)
    }

    /// Settings snapshot for the process-local subscriber.
    pub fn default_settings(&self) -> NotificationSettings {
        NotificationSettings {
            prayer_start: self.prayer_start,
            prayer_ending: self.prayer_ending,
            dua_reminders: self.dua_reminders,
            timezone: self.default_timezone.clone(),
            latitude: self.default_latitude,
            longitude: self.default_longitude,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
