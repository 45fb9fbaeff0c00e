use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Whether `timezone` names a zone in the IANA registry. Commands use
/// this separately from [`resolve`] to tell the user which field was
/// bad.
pub fn is_valid_timezone(timezone: &str) -> bool {
    timezone.parse::<Tz>().is_ok()
}

/// Resolves a user-entered showtime to an absolute instant.
///
/// `time` is a 12-hour clock with meridiem ("7:30PM", case-insensitive),
/// `timezone` an IANA zone name, `date` either `dd/mm` or empty for
/// "today in that zone". A `dd/mm` date always lands in the current
/// year, even when that day has already passed. Returns `None` for any
/// malformed input or a datetime that does not exist in the zone.
pub fn resolve(time: &str, timezone: &str, date: &str) -> Option<DateTime<Utc>> {
    resolve_at(time, timezone, date, Utc::now())
}

fn resolve_at(time: &str, timezone: &str, date: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let tz: Tz = timezone.parse().ok()?;
    let clock = NaiveTime::parse_from_str(&time.trim().to_uppercase(), "%I:%M%p").ok()?;

    let today = now.with_timezone(&tz).date_naive();
    let day = if date.trim().is_empty() {
        today
    } else {
        // dd/mm with no year; rejects calendar-invalid dates like 31/02
        NaiveDate::parse_from_str(&format!("{}/{}", date.trim(), today.year()), "%d/%m/%Y").ok()?
    };

    match tz.from_local_datetime(&day.and_time(clock)) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        // Clocks rolled back; take the earlier of the two readings
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        // Skipped by a DST transition
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_today_in_gmt() {
        let instant = resolve_at("7:30PM", "GMT", "", fixed_now()).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 6, 15, 19, 30, 0).unwrap());
    }

    #[test]
    fn test_resolve_lowercase_meridiem() {
        let instant = resolve_at("7:30pm", "GMT", "", fixed_now()).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 6, 15, 19, 30, 0).unwrap());
    }

    #[test]
    fn test_resolve_offset_zone() {
        // 7:30PM in New York is 11:30PM UTC during DST
        let instant = resolve_at("7:30PM", "America/New_York", "", fixed_now()).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 6, 15, 23, 30, 0).unwrap());
    }

    #[test]
    fn test_resolve_explicit_date() {
        let instant = resolve_at("7:30PM", "GMT", "05/02", fixed_now()).unwrap();
        // Current year, even though February has already passed
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 2, 5, 19, 30, 0).unwrap());
    }

    #[test]
    fn test_resolve_rejects_bad_hour() {
        assert_eq!(resolve_at("25:00PM", "GMT", "", fixed_now()), None);
    }

    #[test]
    fn test_resolve_rejects_unknown_zone() {
        assert_eq!(resolve_at("7:30PM", "NotAZone", "", fixed_now()), None);
        assert!(!is_valid_timezone("NotAZone"));
        assert!(is_valid_timezone("GMT"));
        assert!(is_valid_timezone("America/New_York"));
    }

    #[test]
    fn test_resolve_rejects_impossible_date() {
        assert_eq!(resolve_at("7:30PM", "GMT", "31/02", fixed_now()), None);
    }

    #[test]
    fn test_resolve_rejects_dst_gap() {
        // 2:30AM on 10 March 2024 does not exist in US Eastern time
        assert_eq!(
            resolve_at("2:30AM", "America/New_York", "10/03", fixed_now()),
            None
        );
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert_eq!(resolve_at("", "GMT", "", fixed_now()), None);
        assert_eq!(resolve_at("730PM", "GMT", "", fixed_now()), None);
        assert_eq!(resolve_at("7:30PM", "GMT", "tomorrow", fixed_now()), None);
    }
}
