//! # Prayer Times Calculation
//!
//! Computes the six daily boundaries (Fajr, Sunrise, Dhuhr, Asr, Maghrib, Isha)
//! from an approximate solar position: declination and equation of time from
//! the mean anomaly and ecliptic longitude, then hour angles for each sun
//! altitude. Accuracy is within a minute or two for inhabited latitudes,
//! which matches the minute resolution the results are rounded to.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Angle-based fallback for Fajr/Isha at high latitudes
//! - 1.0.0: Initial release with MWL, ISNA, Karachi, Egypt and Umm al-Qura methods

use chrono::{Datelike, DateTime, Duration, NaiveDate, NaiveTime, Utc};

use super::types::{Coordinates, Madhab, PrayerTimes};
use crate::core::error::{Result, ScheduleError};

/// Sun altitude (degrees below horizon) for sunrise and sunset, including refraction.
const RISE_SET_ANGLE: f64 = 0.833;

/// Refinement passes over the initial guesses.
const ITERATIONS: usize = 2;

/// Initial guesses in local solar hours: fajr, sunrise, dhuhr, asr, maghrib, isha.
const INITIAL_GUESS: [f64; 6] = [5.0, 6.0, 12.0, 13.0, 18.0, 18.0];

/// Replaceable prayer-time source. Implementations must be deterministic for a
/// given (date, coordinates, madhab).
pub trait PrayerTimeCalculator: Send + Sync {
    fn calculate(&self, date: NaiveDate, coords: Coordinates, madhab: Madhab)
        -> Result<PrayerTimes>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IshaRule {
    /// Sun depression angle in degrees.
    Angle(f64),
    /// Fixed interval after Maghrib.
    MinutesAfterMaghrib(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalculationMethod {
    /// Muslim World League
    #[default]
    MuslimWorldLeague,
    /// Islamic Society of North America
    Isna,
    /// University of Islamic Sciences, Karachi
    Karachi,
    /// Egyptian General Authority of Survey
    Egypt,
    /// Umm al-Qura University, Makkah
    UmmAlQura,
}

impl CalculationMethod {
    pub fn fajr_angle(self) -> f64 {
        match self {
            CalculationMethod::MuslimWorldLeague => 18.0,
            CalculationMethod::Isna => 15.0,
            CalculationMethod::Karachi => 18.0,
            CalculationMethod::Egypt => 19.5,
            CalculationMethod::UmmAlQura => 18.5,
        }
    }

    pub fn isha_rule(self) -> IshaRule {
        match self {
            CalculationMethod::MuslimWorldLeague => IshaRule::Angle(17.0),
            CalculationMethod::Isna => IshaRule::Angle(15.0),
            CalculationMethod::Karachi => IshaRule::Angle(18.0),
            CalculationMethod::Egypt => IshaRule::Angle(17.5),
            CalculationMethod::UmmAlQura => IshaRule::MinutesAfterMaghrib(90),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AstronomicalCalculator {
    method: CalculationMethod,
}

impl AstronomicalCalculator {
    pub fn new(method: CalculationMethod) -> Self {
        AstronomicalCalculator { method }
    }

    pub fn method(&self) -> CalculationMethod {
        self.method
    }
}

impl PrayerTimeCalculator for AstronomicalCalculator {
    fn calculate(
        &self,
        date: NaiveDate,
        coords: Coordinates,
        madhab: Madhab,
    ) -> Result<PrayerTimes> {
        let undefined = |reason: &str| ScheduleError::PrayerTimesUndefined {
            date,
            latitude: coords.latitude(),
            reason: reason.to_string(),
        };

        let day = SolarDay::new(date, coords);
        let fajr_angle = self.method.fajr_angle();
        let isha_angle = match self.method.isha_rule() {
            IshaRule::Angle(angle) => Some(angle),
            IshaRule::MinutesAfterMaghrib(_) => None,
        };

        let mut guess = INITIAL_GUESS;
        let mut raw: [Option<f64>; 6] = [None; 6];
        for _ in 0..ITERATIONS {
            let t = guess.map(|h| h / 24.0);
            raw = [
                day.sun_angle_time(fajr_angle, t[0], true),
                day.sun_angle_time(RISE_SET_ANGLE, t[1], true),
                Some(day.mid_day(t[2])),
                day.asr_time(madhab.asr_shadow_factor(), t[3]),
                day.sun_angle_time(RISE_SET_ANGLE, t[4], false),
                isha_angle.and_then(|angle| day.sun_angle_time(angle, t[5], false)),
            ];
            for (slot, value) in guess.iter_mut().zip(raw.iter()) {
                if let Some(v) = value {
                    *slot = *v;
                }
            }
        }

        let [fajr, sunrise, dhuhr, asr, sunset, isha] = raw;
        let sunrise = sunrise.ok_or_else(|| undefined("the sun does not rise"))?;
        let sunset = sunset.ok_or_else(|| undefined("the sun does not set"))?;
        let asr = asr.ok_or_else(|| undefined("no Asr shadow length is reached"))?;
        let dhuhr = dhuhr.ok_or_else(|| undefined("no solar noon"))?;

        // Angle-based fallback: Fajr and Isha take at most angle/60 of the night.
        let night = time_diff(sunset, sunrise);
        let fajr_portion = fajr_angle / 60.0 * night;
        let fajr = match fajr {
            Some(f) if time_diff(f, sunrise) <= fajr_portion => f,
            _ => sunrise - fajr_portion,
        };
        let isha = match self.method.isha_rule() {
            IshaRule::MinutesAfterMaghrib(minutes) => sunset + minutes as f64 / 60.0,
            IshaRule::Angle(angle) => {
                let portion = angle / 60.0 * night;
                match isha {
                    Some(i) if time_diff(sunset, i) <= portion => i,
                    _ => sunset + portion,
                }
            }
        };

        let times = PrayerTimes {
            date,
            fajr: day.to_instant(fajr),
            sunrise: day.to_instant(sunrise),
            dhuhr: day.to_instant(dhuhr),
            asr: day.to_instant(asr),
            maghrib: day.to_instant(sunset),
            isha: day.to_instant(isha),
        };

        if !times.is_ordered() {
            return Err(undefined("computed times are not in daily order"));
        }
        Ok(times)
    }
}

/// Solar geometry for one date at one location.
struct SolarDay {
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
    julian_date: f64,
}

impl SolarDay {
    fn new(date: NaiveDate, coords: Coordinates) -> Self {
        SolarDay {
            date,
            latitude: coords.latitude(),
            longitude: coords.longitude(),
            julian_date: julian_date(date) - coords.longitude() / (15.0 * 24.0),
        }
    }

    /// Solar noon in local solar hours.
    fn mid_day(&self, t: f64) -> f64 {
        let (_, eqt) = sun_position(self.julian_date + t);
        fix_hour(12.0 - eqt)
    }

    /// Time at which the sun is `angle` degrees below the horizon, before
    /// noon when `ccw` is set. `None` when the sun never gets there.
    fn sun_angle_time(&self, angle: f64, t: f64, ccw: bool) -> Option<f64> {
        let (decl, _) = sun_position(self.julian_date + t);
        let noon = self.mid_day(t);
        let x = (-dsin(angle) - dsin(decl) * dsin(self.latitude))
            / (dcos(decl) * dcos(self.latitude));
        if !x.is_finite() || !(-1.0..=1.0).contains(&x) {
            return None;
        }
        let hours = darccos(x) / 15.0;
        Some(if ccw { noon - hours } else { noon + hours })
    }

    fn asr_time(&self, factor: f64, t: f64) -> Option<f64> {
        let (decl, _) = sun_position(self.julian_date + t);
        let angle = -darccot(factor + dtan((self.latitude - decl).abs()));
        self.sun_angle_time(angle, t, false)
    }

    /// Converts local solar hours into a UTC instant, rounded to the minute.
    fn to_instant(&self, hours: f64) -> DateTime<Utc> {
        let utc_minutes = ((hours - self.longitude / 15.0) * 60.0).round() as i64;
        self.date.and_time(NaiveTime::MIN).and_utc()
            + Duration::minutes(utc_minutes)
    }
}

/// Declination (degrees) and equation of time (hours).
fn sun_position(jd: f64) -> (f64, f64) {
    let d = jd - 2451545.0;
    let g = fix_angle(357.529 + 0.98560028 * d);
    let q = fix_angle(280.459 + 0.98564736 * d);
    let l = fix_angle(q + 1.915 * dsin(g) + 0.020 * dsin(2.0 * g));
    let e = 23.439 - 0.00000036 * d;

    let ra = darctan2(dcos(e) * dsin(l), dcos(l)) / 15.0;
    let eqt = q / 15.0 - fix_hour(ra);
    let decl = darcsin(dsin(e) * dsin(l));
    (decl, eqt)
}

fn julian_date(date: NaiveDate) -> f64 {
    let (mut year, mut month) = (date.year() as f64, date.month() as f64);
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }
    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + date.day() as f64
        + b
        - 1524.5
}

fn time_diff(from: f64, to: f64) -> f64 {
    fix_hour(to - from)
}

fn fix_angle(a: f64) -> f64 {
    a - 360.0 * (a / 360.0).floor()
}

fn fix_hour(a: f64) -> f64 {
    a - 24.0 * (a / 24.0).floor()
}

fn dsin(d: f64) -> f64 {
    d.to_radians().sin()
}

fn dcos(d: f64) -> f64 {
    d.to_radians().cos()
}

fn dtan(d: f64) -> f64 {
    d.to_radians().tan()
}

fn darcsin(x: f64) -> f64 {
    x.asin().to_degrees()
}

fn darccos(x: f64) -> f64 {
    x.acos().to_degrees()
}

fn darctan2(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

fn darccot(x: f64) -> f64 {
    (1.0 / x).atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn dhaka() -> Coordinates {
        Coordinates::new(23.8103, 90.4125).unwrap()
    }

    fn local_hm(t: DateTime<Utc>, offset_hours: i32) -> (u32, u32) {
        let local = t.with_timezone(&FixedOffset::east_opt(offset_hours * 3600).unwrap());
        (local.hour(), local.minute())
    }

    #[test]
    fn test_dhaka_times_are_plausible() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let times = AstronomicalCalculator::default()
            .calculate(date, dhaka(), Madhab::Hanafi)
            .unwrap();

        assert!(times.is_ordered());
        assert_eq!(local_hm(times.fajr, 6).0, 4);
        assert_eq!(local_hm(times.sunrise, 6).0, 5);
        assert_eq!(local_hm(times.dhuhr, 6).0, 11);
        assert_eq!(local_hm(times.asr, 6).0, 15);
        assert_eq!(local_hm(times.maghrib, 6).0, 17);
        assert_eq!(local_hm(times.isha, 6).0, 18);
    }

    #[test]
    fn test_times_rounded_to_minute() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let times = AstronomicalCalculator::default()
            .calculate(date, dhaka(), Madhab::Shafii)
            .unwrap();
        for t in [times.fajr, times.sunrise, times.dhuhr, times.asr, times.maghrib, times.isha] {
            assert_eq!(t.second(), 0);
        }
    }

    #[test]
    fn test_hanafi_asr_is_later() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let calc = AstronomicalCalculator::default();
        let hanafi = calc.calculate(date, dhaka(), Madhab::Hanafi).unwrap();
        let shafii = calc.calculate(date, dhaka(), Madhab::Shafii).unwrap();

        assert!(hanafi.asr > shafii.asr);
        // Nothing else depends on the madhab
        assert_eq!(hanafi.fajr, shafii.fajr);
        assert_eq!(hanafi.isha, shafii.isha);
    }

    #[test]
    fn test_deterministic() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let calc = AstronomicalCalculator::default();
        let a = calc.calculate(date, dhaka(), Madhab::Maliki).unwrap();
        let b = calc.calculate(date, dhaka(), Madhab::Maliki).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_high_latitude_summer_uses_fallback() {
        // Fajr at 18 degrees never happens in London around the solstice
        let london = Coordinates::new(51.5074, -0.1278).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
        let times = AstronomicalCalculator::default()
            .calculate(date, london, Madhab::Shafii)
            .unwrap();
        assert!(times.is_ordered());
        assert!(times.fajr < times.sunrise);
    }

    #[test]
    fn test_polar_day_is_undefined() {
        let tromso = Coordinates::new(70.0, 25.0).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let err = AstronomicalCalculator::default()
            .calculate(date, tromso, Madhab::Hanafi)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::PrayerTimesUndefined { .. }));
    }

    #[test]
    fn test_umm_al_qura_isha_follows_maghrib() {
        let mecca = Coordinates::new(21.4225, 39.8262).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let times = AstronomicalCalculator::new(CalculationMethod::UmmAlQura)
            .calculate(date, mecca, Madhab::Hanbali)
            .unwrap();
        let gap = (times.isha - times.maghrib).num_minutes();
        assert!((89..=91).contains(&gap));
    }

    #[test]
    fn test_julian_date_epoch() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(julian_date(date), 2451544.5);
    }
}
