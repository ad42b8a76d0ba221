//! Titles and bodies for scheduled notifications.
//!
//! Bodies rotate through small pools. The pick is seeded from the local date
//! and the notification tag, so a day's schedule is stable across requests
//! and changes from one day to the next.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{DuaCategory, Prayer};

pub fn prayer_start_title(prayer: Prayer) -> String {
    match prayer {
        Prayer::Fajr => "🌅 Fajr has begun".to_string(),
        Prayer::Dhuhr => "🕐 Dhuhr has begun".to_string(),
        Prayer::Asr => "🌤️ Asr has begun".to_string(),
        Prayer::Maghrib => "🌆 Maghrib has begun".to_string(),
        Prayer::Isha => "🌙 Isha has begun".to_string(),
        Prayer::Sunrise => "☀️ Sunrise".to_string(),
    }
}

pub fn prayer_ending_title(prayer: Prayer, minutes_left: i64) -> String {
    format!("⏰ {prayer} Ending in {minutes_left} minutes!")
}

pub fn dua_title(category: DuaCategory) -> String {
    match category {
        DuaCategory::Morning => "🌅 Morning Dua Reminder".to_string(),
        DuaCategory::Midday => "☀️ Midday Dua Reminder".to_string(),
        DuaCategory::Evening => "🌆 Evening Dua Reminder".to_string(),
        DuaCategory::Night => "🌙 Night Dua Reminder".to_string(),
    }
}

const FAJR_START: &[&str] = &[
    "The dawn prayer is here. A few quiet minutes before the world wakes up.",
    "Fajr time. Start the day with the prayer that is witnessed.",
    "Wake up, Fajr has started and the day is waiting for you.",
];

const DHUHR_START: &[&str] = &[
    "Midday prayer time. Step away from the desk for a moment.",
    "Dhuhr is here. Give your soul the break your body already takes.",
    "It is time for Dhuhr. The rest of the day can wait five minutes.",
];

const ASR_START: &[&str] = &[
    "Asr has started. The afternoon is passing, pause and pray.",
    "Time for Asr. Guard the middle prayer.",
    "Asr is here. Your prayer mat is waiting.",
];

const MAGHRIB_START: &[&str] = &[
    "The sun has set. Maghrib time has begun.",
    "Maghrib is here. Its window is short, pray it early.",
    "Sunset prayer time. End the day's work with gratitude.",
];

const ISHA_START: &[&str] = &[
    "Isha has begun. One last conversation before sleep.",
    "Night prayer time. Close the day the right way.",
    "It is time for Isha. Rest comes easier after prayer.",
];

const PRAYER_ENDING: &[&str] = &[
    "Only {minutes} minutes left to pray {prayer}.",
    "{prayer} is ending soon. There are {minutes} minutes remaining.",
    "Last call for {prayer}: {minutes} minutes until its time is over.",
    "Don't let {prayer} slip away, {minutes} minutes to go.",
];

const MORNING_DUA: &[&str] = &[
    "Begin the day with your morning adhkar.",
    "Your morning duas are ready. A strong start to the day.",
    "Before the day gets busy, a few words of remembrance.",
];

const MIDDAY_DUA: &[&str] = &[
    "A midday pause: reset with a short dua.",
    "Halfway through the day. Recharge with remembrance.",
    "Feeling the afternoon slump? A dua will lift it.",
];

const EVENING_DUA: &[&str] = &[
    "Evening adhkar time. Let the day settle.",
    "After a long day, your evening duas are waiting.",
    "Wind down with the evening remembrance.",
];

const NIGHT_DUA: &[&str] = &[
    "Before you sleep, read your night duas.",
    "End the day in remembrance. Your night duas are here.",
    "Ayat al-Kursi and the last three surahs before bed.",
];

pub fn prayer_start_body(prayer: Prayer, date: NaiveDate, tag: &str) -> String {
    let pool = match prayer {
        Prayer::Fajr => FAJR_START,
        Prayer::Dhuhr => DHUHR_START,
        Prayer::Asr => ASR_START,
        Prayer::Maghrib => MAGHRIB_START,
        Prayer::Isha => ISHA_START,
        Prayer::Sunrise => return "The sun has risen.".to_string(),
    };
    pick(pool, date, tag).to_string()
}

pub fn prayer_ending_body(prayer: Prayer, minutes_left: i64, date: NaiveDate, tag: &str) -> String {
    pick(PRAYER_ENDING, date, tag)
        .replace("{prayer}", prayer.name())
        .replace("{minutes}", &minutes_left.to_string())
}

pub fn dua_body(category: DuaCategory, date: NaiveDate, tag: &str) -> String {
    let pool = match category {
        DuaCategory::Morning => MORNING_DUA,
        DuaCategory::Midday => MIDDAY_DUA,
        DuaCategory::Evening => EVENING_DUA,
        DuaCategory::Night => NIGHT_DUA,
    };
    pick(pool, date, tag).to_string()
}

fn pick(pool: &'static [&'static str], date: NaiveDate, tag: &str) -> &'static str {
    let mut rng = StdRng::seed_from_u64(seed_for(date, tag));
    pool[rng.random_range(0..pool.len())]
}

/// FNV-1a over the date and tag; stable across builds, unlike `DefaultHasher`.
fn seed_for(date: NaiveDate, tag: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in date.to_string().bytes().chain(tag.bytes()) {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_stable_for_same_day() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let a = prayer_start_body(Prayer::Fajr, date, "prayer-start-Fajr");
        let b = prayer_start_body(Prayer::Fajr, date, "prayer-start-Fajr");
        assert_eq!(a, b);
        assert!(FAJR_START.contains(&a.as_str()));
    }

    #[test]
    fn test_ending_body_fills_placeholders() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let body = prayer_ending_body(Prayer::Asr, 20, date, "prayer-ending-Asr");
        assert!(body.contains("Asr"));
        assert!(body.contains("20"));
        assert!(!body.contains('{'));
    }

    #[test]
    fn test_titles() {
        assert_eq!(prayer_ending_title(Prayer::Isha, 20), "⏰ Isha Ending in 20 minutes!");
        assert!(dua_title(DuaCategory::Night).contains("Night"));
        assert!(prayer_start_title(Prayer::Dhuhr).contains("Dhuhr"));
    }

    #[test]
    fn test_seed_differs_by_tag() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_ne!(seed_for(date, "dua-morning"), seed_for(date, "dua-night"));
    }
}
