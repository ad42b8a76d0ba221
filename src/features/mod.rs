//! # Features Layer
//!
//! Each feature lives in its own module with a version header. `FEATURES`
//! is the registry logged at startup.

pub mod notifications;
pub mod rate_limiting;
pub mod security;

pub use notifications::{
    Dispatcher, LogSink, Madhab, NotificationEvent, NotificationKind, NotificationScheduler,
    NotificationSettings, NotificationSink,
};
pub use rate_limiting::{client_identifier, RateLimitConfig, RateLimitResult, RateLimiter};
pub use security::{sanitize_input, validate_question};

#[derive(Debug, Clone, Copy)]
pub struct Feature {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub since: &'static str,
    pub toggleable: bool,
    pub description: &'static str,
}

pub const FEATURES: &[Feature] = &[
    Feature {
        id: "notifications",
        name: "Prayer Notifications",
        version: "1.3.0",
        since: "0.1.0",
        toggleable: true,
        description: "Daily prayer start, prayer ending and dua reminders",
    },
    Feature {
        id: "rate_limiting",
        name: "Rate Limiting",
        version: "2.0.0",
        since: "0.1.0",
        toggleable: false,
        description: "Fixed-window request limits per client",
    },
    Feature {
        id: "security",
        name: "Input Security",
        version: "1.0.0",
        since: "0.2.0",
        toggleable: false,
        description: "Prompt-injection filtering for user questions",
    },
];

pub fn get_features() -> &'static [Feature] {
    FEATURES
}

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_ids_unique() {
        let ids: HashSet<_> = FEATURES.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), FEATURES.len());
    }
}
