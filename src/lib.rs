// Core layer - configuration and errors
pub mod core;

// Features layer - notifications, rate limiting, input security
pub mod features;

pub use core::{Config, ScheduleError};

pub use features::{
    // Notifications
    Dispatcher, LogSink, Madhab, NotificationEvent, NotificationKind, NotificationScheduler,
    NotificationSettings, NotificationSink,
    // Rate limiting
    client_identifier, RateLimitConfig, RateLimitResult, RateLimiter,
    // Security
    sanitize_input, validate_question,
};
