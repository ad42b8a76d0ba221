//! # Daily Notification Scheduler
//!
//! Turns one day's prayer times into reminder events: a start notice for each
//! prayer, a warning shortly before each prayer's time runs out (when the next
//! one begins), and dua reminders at fixed local times.
//!
//! The scheduler is pure. The caller passes `now`, and nothing here reads a
//! clock, touches storage or substitutes a default location.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use std::sync::Arc;

use super::messages;
use super::prayer_times::{AstronomicalCalculator, PrayerTimeCalculator};
use super::types::{
    Coordinates, DuaCategory, Madhab, NotificationEvent, NotificationKind, NotificationSettings,
    Prayer, PrayerTimes,
};
use crate::core::error::{Result, ScheduleError};

/// Warning lead time before a prayer's time ends.
pub const DEFAULT_WARNING_MINUTES: i64 = 20;

/// A dua reminder at a fixed local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuaSlot {
    pub category: DuaCategory,
    pub hour: u32,
    pub minute: u32,
}

impl DuaSlot {
    pub const fn new(category: DuaCategory, hour: u32, minute: u32) -> Self {
        DuaSlot {
            category,
            hour,
            minute,
        }
    }
}

pub const DEFAULT_DUA_SLOTS: [DuaSlot; 4] = [
    DuaSlot::new(DuaCategory::Morning, 7, 0),
    DuaSlot::new(DuaCategory::Midday, 13, 0),
    DuaSlot::new(DuaCategory::Evening, 17, 0),
    DuaSlot::new(DuaCategory::Night, 21, 0),
];

#[derive(Clone)]
pub struct NotificationScheduler {
    calculator: Arc<dyn PrayerTimeCalculator>,
    warning_offset: Duration,
    dua_slots: Vec<DuaSlot>,
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationScheduler {
    pub fn new() -> Self {
        NotificationScheduler {
            calculator: Arc::new(AstronomicalCalculator::default()),
            warning_offset: Duration::minutes(DEFAULT_WARNING_MINUTES),
            dua_slots: DEFAULT_DUA_SLOTS.to_vec(),
        }
    }

    pub fn with_calculator(mut self, calculator: impl PrayerTimeCalculator + 'static) -> Self {
        self.calculator = Arc::new(calculator);
        self
    }

    pub fn with_warning_offset(mut self, offset: Duration) -> Self {
        self.warning_offset = offset;
        self
    }

    pub fn with_dua_slots(mut self, slots: Vec<DuaSlot>) -> Self {
        self.dua_slots = slots;
        self
    }

    pub fn warning_offset(&self) -> Duration {
        self.warning_offset
    }

    /// Today's remaining notifications for one subscriber.
    ///
    /// "Today" is the calendar date of `now` in the subscriber's timezone.
    /// Only kinds enabled in `settings` and only events strictly after `now`
    /// are returned, ordered by time, then by kind.
    pub fn daily_notifications(
        &self,
        settings: &NotificationSettings,
        madhab: Madhab,
        now: DateTime<Utc>,
    ) -> Result<Vec<NotificationEvent>> {
        let tz = parse_timezone(&settings.timezone)?;
        let coords = settings.coordinates()?;
        let today = now.with_timezone(&tz).date_naive();

        let events: Vec<NotificationEvent> = self
            .day_schedule(today, tz, coords, madhab)?
            .into_iter()
            .filter(|e| settings.allows(e.kind))
            .filter(|e| e.scheduled_time > now)
            .collect();

        debug!(
            "Scheduled {} notifications for {} ({}, {})",
            events.len(),
            today,
            settings.timezone,
            madhab
        );
        Ok(events)
    }

    /// Every notification for `date`, unfiltered and ordered.
    pub fn day_schedule(
        &self,
        date: NaiveDate,
        tz: Tz,
        coords: Coordinates,
        madhab: Madhab,
    ) -> Result<Vec<NotificationEvent>> {
        let today = self.local_day_times(date, tz, coords, madhab)?;
        let next_date = date
            .succ_opt()
            .ok_or_else(|| ScheduleError::invalid(format!("no day follows {date}")))?;
        let tomorrow = self.local_day_times(next_date, tz, coords, madhab)?;

        let mut events = Vec::with_capacity(Prayer::OBLIGATORY.len() * 2 + self.dua_slots.len());

        for prayer in Prayer::OBLIGATORY {
            events.push(self.prayer_start(prayer, today.get(prayer), date));
        }

        for prayer in Prayer::OBLIGATORY {
            let start = today.get(prayer);
            let warning_at = prayer_end(prayer, &today, &tomorrow) - self.warning_offset;
            if warning_at <= start {
                debug!("Skipping {prayer} ending warning on {date}: window shorter than warning");
                continue;
            }
            events.push(self.prayer_ending(prayer, warning_at, date));
        }

        for slot in &self.dua_slots {
            match local_instant(tz, date, slot.hour, slot.minute) {
                Some(at) => events.push(dua_event(slot.category, at, date)),
                None => warn!(
                    "Dua slot {:02}:{:02} has no instant on {} in {}",
                    slot.hour, slot.minute, date, tz
                ),
            }
        }

        sort_events(&mut events);
        Ok(events)
    }

    /// Prayer times whose Dhuhr falls on `date` in `tz`.
    ///
    /// The calculator works in solar days. Where the zone's offset is far from
    /// local solar time (Pacific/Kiritimati is UTC+14 at 157°W), the solar day
    /// with the same date lands on the neighbouring local day and is shifted.
    fn local_day_times(
        &self,
        date: NaiveDate,
        tz: Tz,
        coords: Coordinates,
        madhab: Madhab,
    ) -> Result<PrayerTimes> {
        let times = self.calculator.calculate(date, coords, madhab)?;
        let drift = (times.dhuhr.with_timezone(&tz).date_naive() - date).num_days();
        if drift == 0 {
            return Ok(times);
        }

        let solar_date = date
            .checked_sub_signed(Duration::days(drift))
            .ok_or_else(|| ScheduleError::invalid(format!("no solar day for {date} in {tz}")))?;
        debug!("Using solar day {solar_date} for local {date} in {tz}");
        let mut times = self.calculator.calculate(solar_date, coords, madhab)?;
        times.date = date;
        Ok(times)
    }

    fn prayer_start(&self, prayer: Prayer, at: DateTime<Utc>, date: NaiveDate) -> NotificationEvent {
        let tag = format!("prayer-start-{prayer}");
        NotificationEvent {
            id: format!("{tag}-{date}"),
            kind: NotificationKind::PrayerStart,
            prayer: Some(prayer),
            category: None,
            scheduled_time: at,
            label: messages::prayer_start_title(prayer),
            body: messages::prayer_start_body(prayer, date, &tag),
            url: "/quran".to_string(),
            tag,
        }
    }

    fn prayer_ending(&self, prayer: Prayer, at: DateTime<Utc>, date: NaiveDate) -> NotificationEvent {
        let tag = format!("prayer-ending-{prayer}");
        let minutes = self.warning_offset.num_minutes();
        NotificationEvent {
            id: format!("{tag}-{date}"),
            kind: NotificationKind::PrayerEnding,
            prayer: Some(prayer),
            category: None,
            scheduled_time: at,
            label: messages::prayer_ending_title(prayer, minutes),
            body: messages::prayer_ending_body(prayer, minutes, date, &tag),
            url: "/quran".to_string(),
            tag,
        }
    }
}

fn dua_event(category: DuaCategory, at: DateTime<Utc>, date: NaiveDate) -> NotificationEvent {
    let tag = format!("dua-{}", category.as_str());
    NotificationEvent {
        id: format!("{tag}-{date}"),
        kind: NotificationKind::Dua,
        prayer: None,
        category: Some(category),
        scheduled_time: at,
        label: messages::dua_title(category),
        body: messages::dua_body(category, date, &tag),
        url: "/dashboard".to_string(),
        tag,
    }
}

/// A prayer's time lasts until the next one begins; Isha runs to the next Fajr.
fn prayer_end(prayer: Prayer, today: &PrayerTimes, tomorrow: &PrayerTimes) -> DateTime<Utc> {
    match prayer {
        Prayer::Fajr => today.sunrise,
        Prayer::Sunrise => today.dhuhr,
        Prayer::Dhuhr => today.asr,
        Prayer::Asr => today.maghrib,
        Prayer::Maghrib => today.isha,
        Prayer::Isha => tomorrow.fajr,
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| ScheduleError::invalid(format!("unknown timezone {name:?}: {e}")))
}

/// Wall-clock time on `date` in `tz`. Times inside a DST gap move forward an
/// hour; ambiguous times take the earlier instant.
fn local_instant(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, minute, 0)?);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|t| t.with_timezone(&Utc))
}

fn sort_events(events: &mut Vec<NotificationEvent>) {
    events.sort_by(|a, b| {
        a.scheduled_time
            .cmp(&b.scheduled_time)
            .then(a.kind.cmp(&b.kind))
    });
    events.dedup_by(|a, b| a.kind == b.kind && a.scheduled_time == b.scheduled_time);
}
