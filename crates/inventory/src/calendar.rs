//! Business calendar: which calendar day a timestamp belongs to.
//!
//! The daily reset and dated movements are defined in terms of the business's
//! local day, not UTC. The offset is fixed (configured once per deployment).

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, Utc};

use stockroom_core::{DomainError, DomainResult};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    /// Calendar at `minutes` east of UTC (e.g. `-300` for UTC-5).
    pub fn new(offset_minutes: i32) -> DomainResult<Self> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                DomainError::validation(format!("invalid utc offset: {offset_minutes} minutes"))
            })?;
        Ok(Self { offset })
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Business date of an instant.
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Instant at which a business date starts (local midnight).
    pub fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let shift = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::<Utc>::from_naive_utc_and_offset(local_midnight - shift, Utc)
    }

    /// First day of the month containing `at`.
    pub fn month_start(&self, at: DateTime<Utc>) -> NaiveDate {
        let today = self.date_of(at);
        today.with_day(1).unwrap_or(today)
    }

    /// True when `earlier` and `later` fall on different business days.
    pub fn is_new_day(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> bool {
        self.date_of(earlier) != self.date_of(later)
    }

    /// Local rendering used by reports (`19/10/2026, 14:05:03`).
    pub fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%-d/%-m/%Y, %-H:%M:%S")
            .to_string()
    }

    /// Short local rendering used in tables (`19/10/2026 14:05`).
    pub fn format_short(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%d/%m/%Y %H:%M")
            .to_string()
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Parse a `YYYY-MM-DD` date as sent by date pickers.
pub fn parse_date(input: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("invalid date (expected YYYY-MM-DD): {input:?}")))
}
