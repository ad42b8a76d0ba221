//! # Feature: Prayer Notifications
//!
//! Computes each subscriber's daily reminders from local prayer times
//! (prayer start, prayer ending soon, dua reminders) and delivers them
//! while they are due.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.3.0: Dispatcher with per-day delivery tracking
//! - 1.2.0: Daily-rotating message bodies
//! - 1.1.0: Pluggable prayer time calculator
//! - 1.0.0: Initial release with start, ending and dua reminders

pub mod dispatcher;
pub mod messages;
pub mod prayer_times;
pub mod scheduler;
pub mod types;

pub use dispatcher::{DeliveryTracker, Dispatcher, LogSink, NotificationSink};
pub use prayer_times::{AstronomicalCalculator, CalculationMethod, PrayerTimeCalculator};
pub use scheduler::{DuaSlot, NotificationScheduler, DEFAULT_DUA_SLOTS};
pub use types::{
    Coordinates, DuaCategory, Madhab, NotificationEvent, NotificationKind, NotificationSettings,
    Prayer, PrayerTimes,
};
