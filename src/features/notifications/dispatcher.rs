//! # Notification Dispatcher
//!
//! Polls a subscriber's daily schedule and hands due notifications to a sink.
//! A notification is due during the minute after its scheduled time (longer
//! when ticks are further apart) and is delivered at most once. The schedule
//! is rebuilt when the subscriber's local date changes.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Delivery window follows the tick interval, pending events survive a failed refresh
//! - 1.0.0: Initial release

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use super::scheduler::{parse_timezone, NotificationScheduler};
use super::types::{Madhab, NotificationEvent, NotificationSettings};

/// How long after its scheduled time a notification may still be delivered.
pub const DELIVERY_WINDOW_SECS: i64 = 60;

/// Allowance for a tick firing late when the window is sized from the interval.
const TICK_SLACK_SECS: i64 = 5;

/// Delivery target for due notifications (push service, log, test recorder).
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, event: &NotificationEvent) -> Result<()>;
}

/// Writes notifications to the log.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, event: &NotificationEvent) -> Result<()> {
        info!("🔔 {} | {} ({})", event.label, event.body, event.id);
        debug!("payload: {}", serde_json::to_string(event)?);
        Ok(())
    }
}

/// One day's schedule plus the ids already delivered from it.
#[derive(Debug)]
pub struct DeliveryTracker {
    date: Option<NaiveDate>,
    events: Vec<NotificationEvent>,
    sent: HashSet<String>,
    window: Duration,
}

impl Default for DeliveryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryTracker {
    pub fn new() -> Self {
        DeliveryTracker {
            date: None,
            events: Vec::new(),
            sent: HashSet::new(),
            window: Duration::seconds(DELIVERY_WINDOW_SECS),
        }
    }

    /// Widen the delivery window so ticks `interval` apart cannot step over
    /// an event. Never narrows below `DELIVERY_WINDOW_SECS`.
    pub fn cover_interval(&mut self, interval: std::time::Duration) {
        let needed = Duration::from_std(interval)
            .unwrap_or(Duration::MAX)
            .checked_add(&Duration::seconds(TICK_SLACK_SECS))
            .unwrap_or(Duration::MAX);
        self.window = self.window.max(needed);
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the schedule. Sent markers only survive a reload of the same date.
    pub fn load(&mut self, date: NaiveDate, events: Vec<NotificationEvent>) {
        if self.date != Some(date) {
            self.sent.clear();
        }
        self.date = Some(date);
        self.events = events;
    }

    pub fn needs_refresh(&self, local_date: NaiveDate) -> bool {
        self.date != Some(local_date)
    }

    /// Events in their delivery window at `now`, marked as sent.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<NotificationEvent> {
        let window = self.window;
        let mut due = Vec::new();
        for event in &self.events {
            if self.sent.contains(&event.id) {
                continue;
            }
            let late_by = now - event.scheduled_time;
            if late_by >= Duration::zero() && late_by < window {
                self.sent.insert(event.id.clone());
                due.push(event.clone());
            }
        }
        due
    }

    /// Unsent events that can still be delivered at or after `now`.
    pub fn outstanding(&self, now: DateTime<Utc>) -> Vec<NotificationEvent> {
        let window = self.window;
        self.events
            .iter()
            .filter(|e| !self.sent.contains(&e.id) && now - e.scheduled_time < window)
            .cloned()
            .collect()
    }

    pub fn events(&self) -> &[NotificationEvent] {
        &self.events
    }

    /// Events not yet delivered.
    pub fn pending(&self) -> usize {
        self.events
            .iter()
            .filter(|e| !self.sent.contains(&e.id))
            .count()
    }
}

pub struct Dispatcher {
    scheduler: NotificationScheduler,
    settings: NotificationSettings,
    madhab: Madhab,
    sink: Arc<dyn NotificationSink>,
    tracker: DeliveryTracker,
}

impl Dispatcher {
    pub fn new(
        scheduler: NotificationScheduler,
        settings: NotificationSettings,
        madhab: Madhab,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Dispatcher {
            scheduler,
            settings,
            madhab,
            sink,
            tracker: DeliveryTracker::new(),
        }
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    /// Size the delivery window for ticks `interval` apart.
    pub fn with_tick_interval(mut self, interval: std::time::Duration) -> Self {
        self.tracker.cover_interval(interval);
        self
    }

    /// Refresh the schedule if the day changed, then deliver what is due.
    /// Returns the number of notifications delivered.
    pub fn tick(&mut self, now: DateTime<Utc>) -> usize {
        let tz = match parse_timezone(&self.settings.timezone) {
            Ok(tz) => tz,
            Err(e) => {
                warn!("Skipping notifications: {e}");
                return 0;
            }
        };
        let local_date = now.with_timezone(&tz).date_naive();

        if self.tracker.needs_refresh(local_date) {
            // Yesterday's Isha warning lands after midnight
            let mut events = self.tracker.outstanding(now);
            match self
                .scheduler
                .daily_notifications(&self.settings, self.madhab, now)
            {
                Ok(fresh) => {
                    events.extend(fresh);
                    events.sort_by_key(|e| (e.scheduled_time, e.kind));
                    info!("📅 Loaded {} notifications for {local_date}", events.len());
                }
                Err(e) => {
                    // The day is still marked loaded so the failure is not retried every tick
                    warn!("Failed to build schedule for {local_date}: {e}");
                }
            }
            self.tracker.load(local_date, events);
        }

        let mut delivered = 0;
        for event in self.tracker.take_due(now) {
            match self.sink.deliver(&event) {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Failed to deliver {}: {e}", event.id),
            }
        }
        if delivered > 0 {
            debug!("Delivered {delivered} notifications, {} pending", self.tracker.pending());
        }
        delivered
    }

    /// Tick forever on `interval`.
    pub async fn run(mut self, interval: std::time::Duration) {
        self.tracker.cover_interval(interval);
        let mut ticker = tokio::time::interval(interval);
        info!(
            "Notification dispatcher started (interval: {}s)",
            interval.as_secs()
        );
        loop {
            ticker.tick().await;
            self.tick(Utc::now());
        }
    }
}
