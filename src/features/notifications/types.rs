//! Domain types shared by the prayer-time calculator and the scheduler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{Result, ScheduleError};

/// A validated geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ScheduleError::invalid(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ScheduleError::invalid(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// School of jurisprudence. Only the Asr shadow rule depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Madhab {
    Hanafi,
    #[serde(rename = "Shafi'i", alias = "Shafii")]
    Shafii,
    Maliki,
    Hanbali,
}

impl Madhab {
    /// Shadow length (in object heights, added to the noon shadow) that marks Asr.
    pub fn asr_shadow_factor(self) -> f64 {
        match self {
            Madhab::Hanafi => 2.0,
            Madhab::Shafii | Madhab::Maliki | Madhab::Hanbali => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Madhab::Hanafi => "Hanafi",
            Madhab::Shafii => "Shafi'i",
            Madhab::Maliki => "Maliki",
            Madhab::Hanbali => "Hanbali",
        }
    }
}

impl fmt::Display for Madhab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Madhab {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "hanafi" => Ok(Madhab::Hanafi),
            "shafii" | "shafi" => Ok(Madhab::Shafii),
            "maliki" => Ok(Madhab::Maliki),
            "hanbali" => Ok(Madhab::Hanbali),
            _ => Err(ScheduleError::invalid(format!("unknown madhab {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// The five daily prayers, in order. Sunrise is a boundary, not a prayer.
    pub const OBLIGATORY: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Computed times for one local date, as UTC instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerTimes {
    pub date: NaiveDate,
    pub fajr: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub dhuhr: DateTime<Utc>,
    pub asr: DateTime<Utc>,
    pub maghrib: DateTime<Utc>,
    pub isha: DateTime<Utc>,
}

impl PrayerTimes {
    pub fn get(&self, prayer: Prayer) -> DateTime<Utc> {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }

    /// True when Fajr < Sunrise < Dhuhr < Asr < Maghrib < Isha.
    pub fn is_ordered(&self) -> bool {
        let times = [
            self.fajr,
            self.sunrise,
            self.dhuhr,
            self.asr,
            self.maghrib,
            self.isha,
        ];
        times.windows(2).all(|w| w[0] < w[1])
    }
}

/// Declaration order is the tie-break order for coincident events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PrayerStart,
    PrayerEnding,
    Dua,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::PrayerStart => "prayer_start",
            NotificationKind::PrayerEnding => "prayer_ending",
            NotificationKind::Dua => "dua",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuaCategory {
    Morning,
    Midday,
    Evening,
    Night,
}

impl DuaCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DuaCategory::Morning => "morning",
            DuaCategory::Midday => "midday",
            DuaCategory::Evening => "evening",
            DuaCategory::Night => "night",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prayer: Option<Prayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<DuaCategory>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub scheduled_time: DateTime<Utc>,
    /// Notification title.
    pub label: String,
    pub body: String,
    pub url: String,
    pub tag: String,
}

/// Per-user subscription snapshot, owned by the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub prayer_start: bool,
    pub prayer_ending: bool,
    pub dua_reminders: bool,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NotificationSettings {
    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::PrayerStart => self.prayer_start,
            NotificationKind::PrayerEnding => self.prayer_ending,
            NotificationKind::Dua => self.dua_reminders,
        }
    }

    pub fn coordinates(&self) -> Result<Coordinates> {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_bounds() {
        assert!(Coordinates::new(23.8103, 90.4125).is_ok());
        assert!(Coordinates::new(90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.5, 0.0).unwrap_err().is_invalid_input());
        assert!(Coordinates::new(0.0, 180.1).unwrap_err().is_invalid_input());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_madhab_parsing() {
        assert_eq!("hanafi".parse::<Madhab>().unwrap(), Madhab::Hanafi);
        assert_eq!("Shafi'i".parse::<Madhab>().unwrap(), Madhab::Shafii);
        assert_eq!(" SHAFI ".parse::<Madhab>().unwrap(), Madhab::Shafii);
        assert_eq!("Hanbali".parse::<Madhab>().unwrap(), Madhab::Hanbali);
        assert!("zahiri".parse::<Madhab>().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_asr_factor() {
        assert_eq!(Madhab::Hanafi.asr_shadow_factor(), 2.0);
        assert_eq!(Madhab::Maliki.asr_shadow_factor(), 1.0);
    }

    #[test]
    fn test_kind_ordering() {
        assert!(NotificationKind::PrayerStart < NotificationKind::PrayerEnding);
        assert!(NotificationKind::PrayerEnding < NotificationKind::Dua);
    }

    #[test]
    fn test_settings_allows() {
        let settings = NotificationSettings {
            prayer_start: true,
            prayer_ending: false,
            dua_reminders: true,
            timezone: "Asia/Dhaka".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        };
        assert!(settings.allows(NotificationKind::PrayerStart));
        assert!(!settings.allows(NotificationKind::PrayerEnding));
        assert!(settings.allows(NotificationKind::Dua));
    }

    #[test]
    fn test_event_json_shape() {
        let event = NotificationEvent {
            id: "dua-morning-2026-10-16".to_string(),
            kind: NotificationKind::Dua,
            prayer: None,
            category: Some(DuaCategory::Morning),
            scheduled_time: DateTime::from_timestamp(1_760_576_400, 0).unwrap(),
            label: "Morning Dua Reminder".to_string(),
            body: "body".to_string(),
            url: "/dashboard".to_string(),
            tag: "dua-morning".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "dua");
        assert_eq!(json["category"], "morning");
        assert_eq!(json["scheduledTime"], 1_760_576_400_000i64);
        assert!(json.get("prayer").is_none());
    }
}
