//! Calendar and Period Utility
//!
//! Period boundaries (day, week, month, quarter, semester, year) anchored at
//! a reference date, day enumeration, and month-length helpers. Weeks start
//! on Monday.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecurraError;

/// Named reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// The reference day
    Daily,
    /// Monday to Sunday
    Weekly,
    /// Calendar month
    Monthly,
    /// Jan–Mar, Apr–Jun, Jul–Sep, Oct–Dec
    Quarterly,
    /// Jan–Jun, Jul–Dec
    Semestral,
    /// Calendar year
    Yearly,
}

impl PeriodKind {
    /// Months spanned by month-aligned kinds
    fn months(&self) -> Option<u32> {
        match self {
            Self::Daily | Self::Weekly => None,
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Semestral => Some(6),
            Self::Yearly => Some(12),
        }
    }

    /// Move `reference` by `n` whole periods.
    ///
    /// Month-aligned kinds keep the day of month, clamped to the target
    /// month's length (Jan 31 + 1 month = Feb 29 in 2024).
    pub fn shift(&self, reference: NaiveDate, n: i32) -> NaiveDate {
        match self {
            Self::Daily => reference + Duration::days(n as i64),
            Self::Weekly => reference + Duration::weeks(n as i64),
            Self::Monthly | Self::Quarterly | Self::Semestral | Self::Yearly => {
                let span = self.months().unwrap_or(1) as i32;
                let target = step_months(first_of_month(reference), n * span);
                let day = reference.day().min(days_in_month(target));
                target + Duration::days(day as i64 - 1)
            }
        }
    }

    /// Lowercase name as used in config files and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Semestral => "semestral",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = RecurraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Daily),
            "week" | "weekly" => Ok(Self::Weekly),
            "month" | "monthly" => Ok(Self::Monthly),
            "quarter" | "quarterly" => Ok(Self::Quarterly),
            "semester" | "semestral" => Ok(Self::Semestral),
            "year" | "yearly" => Ok(Self::Yearly),
            other => Err(RecurraError::InvalidArgument(format!("unknown period: {}", other))),
        }
    }
}

/// Inclusive calendar-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create range
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Days in the range, ascending
    pub fn days(&self) -> DayIter {
        enumerate_days(self.start, self.end)
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days; 0 when `start > end`
    pub fn len_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }
}

/// Start/end of a named period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBounds {
    /// Period kind
    pub kind: PeriodKind,
    /// First instant (00:00:00.000)
    pub start: NaiveDateTime,
    /// Last instant (23:59:59.999)
    pub end: NaiveDateTime,
}

impl PeriodBounds {
    fn from_dates(kind: PeriodKind, first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            kind,
            start: first.and_time(NaiveTime::MIN),
            end: (last + Duration::days(1)).and_time(NaiveTime::MIN) - Duration::milliseconds(1),
        }
    }

    /// First calendar day
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last calendar day
    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    /// Calendar days covered
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date(), self.end_date())
    }
}

/// Compute the period of `kind` containing `reference`
pub fn period_bounds(reference: NaiveDate, kind: PeriodKind) -> PeriodBounds {
    let (first, last) = match kind {
        PeriodKind::Daily => (reference, reference),
        PeriodKind::Weekly => {
            let monday = week_start(reference);
            (monday, monday + Duration::days(6))
        }
        PeriodKind::Monthly | PeriodKind::Quarterly | PeriodKind::Semestral | PeriodKind::Yearly => {
            let span = kind.months().unwrap_or(1);
            let offset = (reference.month0() % span) as i32;
            let first = step_months(first_of_month(reference), -offset);
            let next = step_months(first, span as i32);
            (first, next - Duration::days(1))
        }
    };
    PeriodBounds::from_dates(kind, first, last)
}

/// Lazy inclusive day sequence; cloning restarts from the current position
#[derive(Debug, Clone)]
pub struct DayIter {
    next: NaiveDate,
    end: NaiveDate,
    exhausted: bool,
}

impl Iterator for DayIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.exhausted || self.next > self.end {
            return None;
        }
        let current = self.next;
        match current.succ_opt() {
            Some(following) if current < self.end => self.next = following,
            _ => self.exhausted = true,
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted || self.next > self.end {
            return (0, Some(0));
        }
        let n = ((self.end - self.next).num_days() + 1) as usize;
        (n, Some(n))
    }
}

/// Every calendar day from `start` to `end`, inclusive
pub fn enumerate_days(start: NaiveDate, end: NaiveDate) -> DayIter {
    DayIter { next: start, end, exhausted: false }
}

/// Days in the month of `date` (28..=31)
pub fn days_in_month(date: NaiveDate) -> u32 {
    match date.month() {
        2 if is_leap_year(date.year()) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Signed number of Monday-aligned weeks from the week of `from` to the week of `to`
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (week_start(to) - week_start(from)).num_days() / 7
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// Move a first-of-month date by whole months
fn step_months(mut first: NaiveDate, months: i32) -> NaiveDate {
    if months > 0 {
        for _ in 0..months {
            first += Duration::days(days_in_month(first) as i64);
        }
    } else {
        for _ in 0..months.unsigned_abs() {
            first = first_of_month(first - Duration::days(1));
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dt(y: i32, m: u32, day: u32, h: u32, min: u32, s: u32, ms: u32) -> NaiveDateTime {
        d(y, m, day).and_hms_milli_opt(h, min, s, ms).unwrap()
    }

    #[test]
    fn test_monthly_bounds_leap_february() {
        let bounds = period_bounds(d(2024, 2, 15), PeriodKind::Monthly);
        assert_eq!(bounds.start, dt(2024, 2, 1, 0, 0, 0, 0));
        assert_eq!(bounds.end, dt(2024, 2, 29, 23, 59, 59, 999));
    }

    #[test]
    fn test_quarterly_and_semestral_bounds() {
        let q = period_bounds(d(2024, 2, 15), PeriodKind::Quarterly);
        assert_eq!(q.start_date(), d(2024, 1, 1));
        assert_eq!(q.end_date(), d(2024, 3, 31));

        let q4 = period_bounds(d(2023, 11, 2), PeriodKind::Quarterly);
        assert_eq!(q4.start_date(), d(2023, 10, 1));
        assert_eq!(q4.end_date(), d(2023, 12, 31));

        let s2 = period_bounds(d(2024, 7, 1), PeriodKind::Semestral);
        assert_eq!(s2.start_date(), d(2024, 7, 1));
        assert_eq!(s2.end_date(), d(2024, 12, 31));

        let s1 = period_bounds(d(2024, 6, 30), PeriodKind::Semestral);
        assert_eq!(s1.start_date(), d(2024, 1, 1));
        assert_eq!(s1.end_date(), d(2024, 6, 30));
    }

    #[test]
    fn test_weekly_bounds_monday_start() {
        // 2024-01-03 is a Wednesday
        let w = period_bounds(d(2024, 1, 3), PeriodKind::Weekly);
        assert_eq!(w.start_date(), d(2024, 1, 1));
        assert_eq!(w.end_date(), d(2024, 1, 7));

        // Sunday belongs to the week that started six days earlier
        let sunday = period_bounds(d(2024, 1, 7), PeriodKind::Weekly);
        assert_eq!(sunday.start_date(), d(2024, 1, 1));
    }

    #[test]
    fn test_yearly_and_daily_bounds() {
        let y = period_bounds(d(2023, 8, 19), PeriodKind::Yearly);
        assert_eq!(y.start, dt(2023, 1, 1, 0, 0, 0, 0));
        assert_eq!(y.end, dt(2023, 12, 31, 23, 59, 59, 999));

        let day = period_bounds(d(2023, 8, 19), PeriodKind::Daily);
        assert_eq!(day.range().len_days(), 1);
    }

    #[test]
    fn test_enumerate_days_inclusive_and_restartable() {
        let days = enumerate_days(d(2024, 2, 27), d(2024, 3, 2));
        let first: Vec<_> = days.clone().collect();
        let second: Vec<_> = days.collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1), d(2024, 3, 2)]
        );
        assert_eq!(enumerate_days(d(2024, 3, 2), d(2024, 3, 1)).count(), 0);
        assert_eq!(enumerate_days(d(2024, 3, 1), d(2024, 3, 1)).count(), 1);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(d(2024, 2, 10)), 29);
        assert_eq!(days_in_month(d(2023, 2, 10)), 28);
        assert_eq!(days_in_month(d(1900, 2, 1)), 28);
        assert_eq!(days_in_month(d(2000, 2, 1)), 29);
        assert_eq!(days_in_month(d(2024, 4, 30)), 30);
        assert_eq!(days_in_month(d(2024, 12, 1)), 31);
    }

    #[test]
    fn test_weeks_between() {
        assert_eq!(weeks_between(d(2024, 1, 1), d(2024, 1, 7)), 0);
        assert_eq!(weeks_between(d(2024, 1, 7), d(2024, 1, 8)), 1);
        assert_eq!(weeks_between(d(2024, 1, 3), d(2024, 1, 29)), 4);
        assert_eq!(weeks_between(d(2024, 1, 15), d(2024, 1, 1)), -2);
    }

    #[test]
    fn test_shift_clamps_month_end() {
        assert_eq!(PeriodKind::Monthly.shift(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(PeriodKind::Monthly.shift(d(2024, 3, 31), -1), d(2024, 2, 29));
        assert_eq!(PeriodKind::Quarterly.shift(d(2024, 2, 15), 1), d(2024, 5, 15));
        assert_eq!(PeriodKind::Yearly.shift(d(2024, 2, 29), 1), d(2025, 2, 28));
        assert_eq!(PeriodKind::Weekly.shift(d(2024, 1, 1), -1), d(2023, 12, 25));
        assert_eq!(PeriodKind::Daily.shift(d(2024, 1, 1), 2), d(2024, 1, 3));
    }

    #[test]
    fn test_period_kind_parse() {
        assert_eq!("Quarter".parse::<PeriodKind>().unwrap(), PeriodKind::Quarterly);
        assert_eq!("semestral".parse::<PeriodKind>().unwrap(), PeriodKind::Semestral);
        assert!("fortnight".parse::<PeriodKind>().is_err());
    }
}
