//! `(year, month)` history partition / snapshot cache key.

use chrono::{DateTime, Datelike, Utc};

/// The earliest year history is available for, per the original system's
/// launch date.
pub const EARLIEST_YEAR: i32 = 2007;

/// A validated `(year, month)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

/// Why a `(year, month)` pair failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MonthKeyError {
    #[error("history for dates before {EARLIEST_YEAR} is not available")]
    IncorrectYear,
    #[error("incorrect date, history for a month that has not yet come")]
    IncorrectMonth,
}

impl MonthKey {
    /// Validates `(year, month)` against §3's rule: `year >= 2007`, and when
    /// `year` is the current year, `month <= now.month()`.
    pub fn new(year: i32, month: u32, now: DateTime<Utc>) -> Result<Self, MonthKeyError> {
        if year < EARLIEST_YEAR {
            return Err(MonthKeyError::IncorrectYear);
        }
        if year == now.year() && month > now.month() {
            return Err(MonthKeyError::IncorrectMonth);
        }
        Ok(Self { year, month })
    }

    /// Encodes the key as `year*100 + month`, used as the snapshot cache key.
    #[must_use]
    pub fn cache_key(self) -> i32 {
        self.year * 100 + i32::try_from(self.month).unwrap_or(0)
    }

    /// `"{year}-{month}"`, used to build the download filename.
    #[must_use]
    pub fn to_filename_part(self) -> String {
        format!("{}-{}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now_2023_08() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 8, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn rejects_years_before_2007() {
        assert_eq!(
            MonthKey::new(2006, 12, now_2023_08()),
            Err(MonthKeyError::IncorrectYear)
        );
    }

    #[test]
    fn rejects_future_month_in_current_year() {
        assert_eq!(
            MonthKey::new(2023, 9, now_2023_08()),
            Err(MonthKeyError::IncorrectMonth)
        );
    }

    #[test]
    fn accepts_past_month_in_a_past_year() {
        assert!(MonthKey::new(2020, 12, now_2023_08()).is_ok());
    }

    #[test]
    fn cache_key_encodes_year_and_month() {
        let key = MonthKey::new(2023, 8, now_2023_08()).unwrap();
        assert_eq!(key.cache_key(), 202_308);
    }
}
