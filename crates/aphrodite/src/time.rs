//! Civil birth time -> UTC instant -> Julian Day.
//!
//! Input problems never fail here: a malformed clock time becomes local noon and an
//! unresolvable zone becomes a zero offset.

use crate::error::EngineError;
use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use regex::Regex;

/// Julian Day of 2000-01-01T12:00:00 TT (J2000.0).
pub const J2000_JD: f64 = 2_451_545.0;

lazy_static::lazy_static! {
    // "+08:00", "-0530", "UTC+8", "GMT -3", "+5:45"
    static ref OFFSET_RE: Regex =
        Regex::new(r"(?i)^\s*(?:utc|gmt)?\s*([+-])\s*(\d{1,2})(?::?(\d{2}))?\s*$").unwrap();
    // Best effort: first signed hour[:minute] anywhere in the string.
    static ref LOOSE_OFFSET_RE: Regex = Regex::new(r"([+-])\s*(\d{1,2})(?::?(\d{2}))?").unwrap();
}

/// How a timezone string was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSpec {
    Utc,
    Named(Tz),
    /// Offset east of UTC, in seconds.
    Fixed(i32),
}

impl ZoneSpec {
    /// Stable text form: spellings of the same zone or offset agree.
    pub fn canonical(self) -> String {
        match self {
            ZoneSpec::Utc | ZoneSpec::Fixed(0) => "UTC".to_string(),
            ZoneSpec::Named(tz) => tz.name().to_string(),
            ZoneSpec::Fixed(secs) => {
                let sign = if secs < 0 { '-' } else { '+' };
                let abs = secs.abs();
                format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
            }
        }
    }
}

/// Parse "HH:MM" (or "HH:MM:SS"). Missing or malformed input yields local noon.
pub fn parse_clock_time(time: Option<&str>) -> NaiveTime {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    let Some(raw) = time.map(str::trim).filter(|t| !t.is_empty()) else {
        return noon;
    };
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .unwrap_or_else(|_| {
            log::debug!("Unparseable birth time {:?}, defaulting to noon", raw);
            noon
        })
}

/// Interpret a timezone identifier or raw offset string.
pub fn parse_zone(zone: Option<&str>) -> ZoneSpec {
    let Some(raw) = zone.map(str::trim).filter(|z| !z.is_empty()) else {
        return ZoneSpec::Utc;
    };
    let upper = raw.to_ascii_uppercase();
    if matches!(upper.as_str(), "Z" | "UTC" | "GMT" | "UT") {
        return ZoneSpec::Utc;
    }
    if let Ok(tz) = raw.parse::<Tz>() {
        return ZoneSpec::Named(tz);
    }
    let captures = OFFSET_RE
        .captures(raw)
        .or_else(|| LOOSE_OFFSET_RE.captures(raw));
    match captures.and_then(|c| offset_seconds(&c)) {
        Some(secs) => ZoneSpec::Fixed(secs),
        None => {
            log::debug!("Unresolvable timezone {:?}, assuming UTC", raw);
            ZoneSpec::Utc
        }
    }
}

fn offset_seconds(caps: &regex::Captures<'_>) -> Option<i32> {
    let sign = if caps.get(1)?.as_str() == "-" { -1 } else { 1 };
    let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
    let minutes: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if hours > 14 || minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

/// Resolve a local civil date/time in the given zone to a UTC instant.
///
/// Offsets that move the local time across midnight roll the civil date (and
/// month/year) over in either direction.
pub fn normalize_to_utc(date: NaiveDate, time: Option<&str>, zone: Option<&str>) -> DateTime<Utc> {
    let local = NaiveDateTime::new(date, parse_clock_time(time));
    local_to_utc(local, parse_zone(zone))
}

pub fn local_to_utc(local: NaiveDateTime, zone: ZoneSpec) -> DateTime<Utc> {
    match zone {
        ZoneSpec::Utc => Utc.from_utc_datetime(&local),
        ZoneSpec::Fixed(secs) => Utc.from_utc_datetime(&(local - Duration::seconds(secs as i64))),
        ZoneSpec::Named(tz) => {
            // Ambiguous (DST fall-back) picks the earlier instant; a skipped
            // local time (spring-forward gap) is pushed forward an hour.
            let resolved = tz
                .from_local_datetime(&local)
                .earliest()
                .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest());
            match resolved {
                Some(dt) => dt.with_timezone(&Utc),
                None => {
                    log::debug!("Local time {} does not exist in {}, assuming UTC", local, tz);
                    Utc.from_utc_datetime(&local)
                }
            }
        }
    }
}

/// Fractional Julian Day for a UTC instant (proleptic Gregorian calendar, Meeus ch. 7).
pub fn julian_day(dt: DateTime<Utc>) -> f64 {
    let mut year = dt.year() as f64;
    let mut month = dt.month() as f64;
    let day_fraction = (dt.hour() as f64
        + dt.minute() as f64 / 60.0
        + (dt.second() as f64 + dt.nanosecond() as f64 / 1e9) / 3600.0)
        / 24.0;
    let day = dt.day() as f64 + day_fraction;

    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }
    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + day + b - 1524.5
}

/// Julian Day that is guaranteed finite. A non-finite value means an upstream
/// date construction bug, so it is reported instead of coerced.
pub fn checked_julian_day(dt: DateTime<Utc>) -> Result<f64, EngineError> {
    ensure_finite_julian_day(julian_day(dt), dt)
}

pub fn ensure_finite_julian_day(jd: f64, instant: DateTime<Utc>) -> Result<f64, EngineError> {
    if jd.is_finite() {
        Ok(jd)
    } else {
        Err(EngineError::NonFiniteJulianDay { instant })
    }
}

/// Days elapsed since J2000.0.
pub fn days_since_j2000(jd: f64) -> f64 {
    jd - J2000_JD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_missing_time_is_noon() {
        assert_eq!(parse_clock_time(None), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(parse_clock_time(Some("  ")), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(parse_clock_time(Some("25:99")), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(parse_clock_time(Some("08:05")), NaiveTime::from_hms_opt(8, 5, 0).unwrap());
    }

    #[test]
    fn test_fixed_offset_example() {
        let dt = normalize_to_utc(date(1990, 6, 15), Some("08:30"), Some("+08:00"));
        assert_eq!(dt, utc(1990, 6, 15, 0, 30));
    }

    #[test]
    fn test_offset_rolls_back_across_year() {
        // 01:00 on New Year's Day at +05:00 is still the previous year in UTC.
        let dt = normalize_to_utc(date(2000, 1, 1), Some("01:00"), Some("+05:00"));
        assert_eq!(dt, utc(1999, 12, 31, 20, 0));
    }

    #[test]
    fn test_offset_rolls_forward_into_march_of_leap_year() {
        let dt = normalize_to_utc(date(2024, 2, 29), Some("22:00"), Some("UTC-05"));
        assert_eq!(dt, utc(2024, 3, 1, 3, 0));
        let dt = normalize_to_utc(date(2023, 2, 28), Some("22:00"), Some("-05:00"));
        assert_eq!(dt, utc(2023, 3, 1, 3, 0));
    }

    #[test]
    fn test_named_zone() {
        // New York is on EDT (UTC-4) in July.
        let dt = normalize_to_utc(date(2021, 7, 4), Some("09:00"), Some("America/New_York"));
        assert_eq!(dt, utc(2021, 7, 4, 13, 0));
    }

    #[test]
    fn test_named_zone_gap_moves_forward() {
        // 02:30 does not exist in New York on 2021-03-14.
        let dt = normalize_to_utc(date(2021, 3, 14), Some("02:30"), Some("America/New_York"));
        assert_eq!(dt, utc(2021, 3, 14, 7, 30));
    }

    #[test]
    fn test_zone_parsing_variants() {
        assert_eq!(parse_zone(None), ZoneSpec::Utc);
        assert_eq!(parse_zone(Some("Z")), ZoneSpec::Utc);
        assert_eq!(parse_zone(Some("+0530")), ZoneSpec::Fixed(5 * 3600 + 30 * 60));
        assert_eq!(parse_zone(Some("GMT-3")), ZoneSpec::Fixed(-3 * 3600));
        assert_eq!(parse_zone(Some("offset +09:00 (JST)")), ZoneSpec::Fixed(9 * 3600));
        assert_eq!(parse_zone(Some("Mars/Olympus_Mons")), ZoneSpec::Utc);
        assert_eq!(parse_zone(Some("+99:00")), ZoneSpec::Utc);
    }

    #[test]
    fn test_canonical_zone_text() {
        assert_eq!(parse_zone(Some("-0330")).canonical(), "-03:30");
        assert_eq!(parse_zone(Some("UTC+8")).canonical(), "+08:00");
        assert_eq!(parse_zone(Some("+00:00")).canonical(), "UTC");
        assert_eq!(parse_zone(Some("Asia/Tokyo")).canonical(), "Asia/Tokyo");
    }

    #[test]
    fn test_julian_day_reference_points() {
        assert!((julian_day(utc(2000, 1, 1, 12, 0)) - J2000_JD).abs() < 1e-9);
        // Meeus example 7.a: 1957-10-04 19:26:24 UT = JD 2436116.31
        let sputnik = Utc.with_ymd_and_hms(1957, 10, 4, 19, 26, 24).unwrap();
        assert!((julian_day(sputnik) - 2_436_116.31).abs() < 1e-6);
    }

    #[test]
    fn test_julian_day_example_birth() {
        let jd = checked_julian_day(utc(1990, 6, 15, 0, 30)).unwrap();
        assert!(jd.is_finite());
        assert!(jd > 2_448_000.0);
        assert!((jd - 2_448_057.520_833).abs() < 1e-5);
    }

    #[test]
    fn test_non_finite_julian_day_is_rejected() {
        let instant = utc(2000, 1, 1, 0, 0);
        let err = ensure_finite_julian_day(f64::NAN, instant).unwrap_err();
        assert_eq!(err, EngineError::NonFiniteJulianDay { instant });
    }
}
