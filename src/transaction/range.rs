//! Date ranges used by the transaction filter and the recurring scheduler.

use serde::Deserialize;
use time::{Date, Month};

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Whether `date` falls within the range, bounds included.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Preset date ranges for the dashboard filter, anchored to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickRange {
    ThisMonth,
    LastMonth,
    LastThreeMonths,
    ThisYear,
}

impl QuickRange {
    pub const ALL: [QuickRange; 4] = [
        QuickRange::ThisMonth,
        QuickRange::LastMonth,
        QuickRange::LastThreeMonths,
        QuickRange::ThisYear,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ThisMonth => "This month",
            Self::LastMonth => "Last month",
            Self::LastThreeMonths => "Last 3 months",
            Self::ThisYear => "This year",
        }
    }

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::LastThreeMonths => "last-three-months",
            Self::ThisYear => "this-year",
        }
    }

    /// Resolve the preset into concrete dates relative to `today`.
    pub fn range(self, today: Date) -> DateRange {
        match self {
            Self::ThisMonth => month_bounds(today.year(), today.month()),
            Self::LastMonth => {
                let (year, month) = previous_month(today.year(), today.month());

                month_bounds(year, month)
            }
            Self::LastThreeMonths => {
                let (middle_year, middle_month) = previous_month(today.year(), today.month());
                let (start_year, start_month) = previous_month(middle_year, middle_month);

                DateRange {
                    start: month_bounds(start_year, start_month).start,
                    end: month_bounds(today.year(), today.month()).end,
                }
            }
            Self::ThisYear => year_bounds(today.year()),
        }
    }
}

/// The first and last day of the given month.
pub(crate) fn month_bounds(year: i32, month: Month) -> DateRange {
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    DateRange { start, end }
}

fn year_bounds(year: i32) -> DateRange {
    DateRange {
        start: Date::from_calendar_date(year, Month::January, 1).expect("invalid year start date"),
        end: Date::from_calendar_date(year, Month::December, 31).expect("invalid year end date"),
    }
}

pub(crate) fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub(crate) fn previous_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        _ => (year, month.previous()),
    }
}

pub(crate) fn next_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        _ => (year, month.next()),
    }
}
