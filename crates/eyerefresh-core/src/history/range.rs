//! Calendar windows for browsing history.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

use crate::machine::Timestamp;

/// Granularity of a history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for RangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(RangeKind::Day),
            "week" => Ok(RangeKind::Week),
            "month" => Ok(RangeKind::Month),
            "year" => Ok(RangeKind::Year),
            other => Err(format!("unknown range: {other}")),
        }
    }
}

/// A calendar window, interpreted in whatever time zone `bounds` is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Range {
    Day { date: NaiveDate },
    /// ISO week; `monday` is its first day.
    Week { monday: NaiveDate },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl Range {
    /// The window of `kind` that contains `date`.
    pub fn containing(kind: RangeKind, date: NaiveDate) -> Self {
        match kind {
            RangeKind::Day => Range::Day { date },
            RangeKind::Week => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                Range::Week {
                    monday: date.checked_sub_days(Days::new(offset)).unwrap_or(date),
                }
            }
            RangeKind::Month => Range::Month { year: date.year(), month: date.month() },
            RangeKind::Year => Range::Year { year: date.year() },
        }
    }

    pub fn kind(&self) -> RangeKind {
        match self {
            Range::Day { .. } => RangeKind::Day,
            Range::Week { .. } => RangeKind::Week,
            Range::Month { .. } => RangeKind::Month,
            Range::Year { .. } => RangeKind::Year,
        }
    }

    /// First day of the window.
    pub fn first_day(&self) -> Option<NaiveDate> {
        match *self {
            Range::Day { date } => Some(date),
            Range::Week { monday } => Some(monday),
            Range::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            Range::Year { year } => NaiveDate::from_ymd_opt(year, 1, 1),
        }
    }

    /// First day after the window.
    fn end_day(&self) -> Option<NaiveDate> {
        let first = self.first_day()?;
        match self {
            Range::Day { .. } => first.checked_add_days(Days::new(1)),
            Range::Week { .. } => first.checked_add_days(Days::new(7)),
            Range::Month { .. } => first.checked_add_months(Months::new(1)),
            Range::Year { .. } => first.checked_add_months(Months::new(12)),
        }
    }

    /// `[start, end)` in epoch milliseconds, with midnights taken in `tz`.
    ///
    /// `None` for windows outside chrono's representable dates or an
    /// invalid month.
    pub fn bounds<Tz: TimeZone>(&self, tz: &Tz) -> Option<(Timestamp, Timestamp)> {
        let start = local_midnight_ms(tz, self.first_day()?)?;
        let end = local_midnight_ms(tz, self.end_day()?)?;
        Some((start, end))
    }

    pub fn previous(&self) -> Option<Self> {
        self.shift(false)
    }

    pub fn next(&self) -> Option<Self> {
        self.shift(true)
    }

    fn shift(&self, forward: bool) -> Option<Self> {
        let step = |date: NaiveDate, days: u64| {
            if forward {
                date.checked_add_days(Days::new(days))
            } else {
                date.checked_sub_days(Days::new(days))
            }
        };
        let step_months = |date: NaiveDate, months: u32| {
            if forward {
                date.checked_add_months(Months::new(months))
            } else {
                date.checked_sub_months(Months::new(months))
            }
        };

        let first = self.first_day()?;
        Some(match self {
            Range::Day { .. } => Range::Day { date: step(first, 1)? },
            Range::Week { .. } => Range::Week { monday: step(first, 7)? },
            Range::Month { .. } => Range::containing(RangeKind::Month, step_months(first, 1)?),
            Range::Year { .. } => Range::containing(RangeKind::Year, step_months(first, 12)?),
        })
    }
}

fn local_midnight_ms<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<Timestamp> {
    let midnight: NaiveDateTime = date.and_hms_opt(0, 0, 0)?;
    // Where a DST jump skips midnight, the day starts at the first valid hour.
    let local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + chrono::Duration::hours(1))).earliest())?;
    Some(Timestamp::try_from(local.timestamp_millis()).unwrap_or(0))
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range::Day { date } => write!(f, "{date}"),
            Range::Week { monday } => {
                let week = monday.iso_week();
                write!(f, "{}-W{:02}", week.year(), week.week())
            }
            Range::Month { year, month } => write!(f, "{year}-{month:02}"),
            Range::Year { year } => write!(f, "{year}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const DAY_MS: u64 = 24 * 60 * 60 * 1000;

    #[test]
    fn day_bounds_are_half_open_midnights() {
        let (start, end) = Range::Day { date: date(1970, 1, 2) }.bounds(&Utc).unwrap();
        assert_eq!(start, DAY_MS);
        assert_eq!(end, 2 * DAY_MS);
    }

    #[test]
    fn bounds_respect_time_zone_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let (start, _) = Range::Day { date: date(1970, 1, 2) }.bounds(&plus_two).unwrap();
        assert_eq!(start, DAY_MS - 2 * 3600 * 1000);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-07 is a Thursday
        let week = Range::containing(RangeKind::Week, date(2024, 3, 7));
        assert_eq!(week, Range::Week { monday: date(2024, 3, 4) });
        let (start, end) = week.bounds(&Utc).unwrap();
        assert_eq!(end - start, 7 * DAY_MS);
        assert_eq!(week.to_string(), "2024-W10");
    }

    #[test]
    fn week_crossing_year_boundary() {
        // 2025-01-01 is a Wednesday; its ISO week starts in 2024
        let week = Range::containing(RangeKind::Week, date(2025, 1, 1));
        assert_eq!(week, Range::Week { monday: date(2024, 12, 30) });
        assert_eq!(week.to_string(), "2025-W01");
    }

    #[test]
    fn month_length_follows_calendar() {
        let feb = Range::containing(RangeKind::Month, date(2024, 2, 10));
        let (start, end) = feb.bounds(&Utc).unwrap();
        assert_eq!(end - start, 29 * DAY_MS);
    }

    #[test]
    fn navigation_wraps_months_and_years() {
        let jan = Range::Month { year: 2024, month: 1 };
        assert_eq!(jan.previous(), Some(Range::Month { year: 2023, month: 12 }));
        assert_eq!(jan.next(), Some(Range::Month { year: 2024, month: 2 }));

        let year = Range::Year { year: 2024 };
        assert_eq!(year.next(), Some(Range::Year { year: 2025 }));

        let day = Range::Day { date: date(2024, 3, 1) };
        assert_eq!(day.previous(), Some(Range::Day { date: date(2024, 2, 29) }));

        let week = Range::Week { monday: date(2024, 12, 30) };
        assert_eq!(week.next(), Some(Range::Week { monday: date(2025, 1, 6) }));
    }

    #[test]
    fn next_then_previous_is_identity() {
        let ranges = [
            Range::Day { date: date(2024, 5, 31) },
            Range::Week { monday: date(2024, 5, 27) },
            Range::Month { year: 2024, month: 5 },
            Range::Year { year: 2024 },
        ];
        for r in ranges {
            assert_eq!(r.next().and_then(|n| n.previous()), Some(r));
        }
    }

    #[test]
    fn adjacent_ranges_share_a_boundary() {
        let month = Range::Month { year: 2024, month: 3 };
        let (_, end) = month.bounds(&Utc).unwrap();
        let (next_start, _) = month.next().unwrap().bounds(&Utc).unwrap();
        assert_eq!(end, next_start);
    }

    #[test]
    fn invalid_month_has_no_bounds() {
        assert_eq!(Range::Month { year: 2024, month: 13 }.bounds(&Utc), None);
    }

    #[test]
    fn range_kind_parses_lowercase_names() {
        assert_eq!("week".parse::<RangeKind>(), Ok(RangeKind::Week));
        assert!("fortnight".parse::<RangeKind>().is_err());
    }
}
