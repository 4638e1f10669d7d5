use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Kolkata;
use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Civil date in Asia/Kolkata at `now`, independent of the server's local zone.
pub fn kolkata_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Kolkata).date_naive()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Caller-supplied date wins; otherwise today in Kolkata.
pub fn resolve_date(requested: Option<&str>, now: DateTime<Utc>) -> Result<String, AppError> {
    match requested.map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Ok(parse_date(raw)?.format(DATE_FORMAT).to_string()),
        None => Ok(kolkata_today(now).format(DATE_FORMAT).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn late_utc_evening_is_next_day_in_kolkata() {
        // 20:00 UTC is 01:30 IST on the following day.
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 20, 0, 0).unwrap();
        assert_eq!(resolve_date(None, now).unwrap(), "2024-06-10");
    }

    #[test]
    fn early_utc_morning_is_same_day_in_kolkata() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 2, 0, 0).unwrap();
        assert_eq!(resolve_date(None, now).unwrap(), "2024-06-10");
    }

    #[test]
    fn boundary_at_kolkata_midnight() {
        // 18:29:59 UTC = 23:59:59 IST; 18:30 UTC = 00:00 IST next day.
        let before = Utc.with_ymd_and_hms(2024, 12, 31, 18, 29, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 12, 31, 18, 30, 0).unwrap();
        assert_eq!(resolve_date(None, before).unwrap(), "2024-12-31");
        assert_eq!(resolve_date(None, after).unwrap(), "2025-01-01");
    }

    #[test]
    fn supplied_date_is_kept_and_normalised() {
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 20, 0, 0).unwrap();
        assert_eq!(resolve_date(Some(" 2024-01-05 "), now).unwrap(), "2024-01-05");
        assert_eq!(resolve_date(Some(""), now).unwrap(), "2024-06-10");
    }

    #[test]
    fn malformed_date_is_a_validation_error() {
        let now = Utc::now();
        assert!(matches!(resolve_date(Some("10/06/2024"), now), Err(AppError::Validation(_))));
        assert!(matches!(resolve_date(Some("2024-02-30"), now), Err(AppError::Validation(_))));
    }
}
