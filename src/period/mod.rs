//! Calendar period boundaries and their symmetric predecessors.
//!
//! Every reporting window is a [`PeriodRange`]: a start instant, an end
//! instant clamped to 23:59:59.999 of its calendar day, and a display
//! label. `previous_period_at` derives a contiguous, non-overlapping,
//! equal-duration predecessor for any period type, wrapping across year
//! boundaries where the calendar requires it.
//!
//! All functions here are pure; "now" is injected so callers (and tests)
//! control the evaluation instant.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dates::{end_of_day, start_of_day};

/// Named reporting window kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Week,
    Month,
    Quarter,
    Semester,
    Year,
    Custom,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Week => "week",
            PeriodType::Month => "month",
            PeriodType::Quarter => "quarter",
            PeriodType::Semester => "semester",
            PeriodType::Year => "year",
            PeriodType::Custom => "custom",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown period type: {0:?} (expected week|month|quarter|semester|year|custom)")]
pub struct InvalidPeriod(String);

impl FromStr for PeriodType {
    type Err = InvalidPeriod;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(PeriodType::Week),
            "month" => Ok(PeriodType::Month),
            "quarter" => Ok(PeriodType::Quarter),
            "semester" => Ok(PeriodType::Semester),
            "year" => Ok(PeriodType::Year),
            "custom" => Ok(PeriodType::Custom),
            _ => Err(InvalidPeriod(raw.to_string())),
        }
    }
}

/// A concrete reporting window. Invariant: `start <= end`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Display label; informational only, never part of the arithmetic.
    pub label: String,
}

impl PeriodRange {
    /// Whether an instant falls inside the window, bounds inclusive.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }
}

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Spanish display name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

fn first_of(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid first-of-month date")
}

/// First and last day of the `index`-th quarter (0-based) of `year`.
fn quarter_bounds(year: i32, index: u32) -> (NaiveDate, NaiveDate) {
    let start = first_of(year, index * 3 + 1);
    let end = if index == 3 {
        first_of(year + 1, 1) - Duration::days(1)
    } else {
        first_of(year, (index + 1) * 3 + 1) - Duration::days(1)
    };
    (start, end)
}

/// First and last day of the `index`-th semester (0-based) of `year`.
fn semester_bounds(year: i32, index: u32) -> (NaiveDate, NaiveDate) {
    let start = first_of(year, index * 6 + 1);
    let end = if index == 1 {
        first_of(year + 1, 1) - Duration::days(1)
    } else {
        first_of(year, 7) - Duration::days(1)
    };
    (start, end)
}

fn month_label(day: NaiveDate) -> String {
    format!("{} {}", month_name(day.month()), day.year())
}

fn span_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y"))
}

fn current_month_range(today: NaiveDate) -> PeriodRange {
    PeriodRange {
        start: start_of_day(first_of(today.year(), today.month())),
        end: end_of_day(today),
        label: month_label(today),
    }
}

fn previous_month_range(today: NaiveDate) -> PeriodRange {
    let last_of_previous = first_of(today.year(), today.month()) - Duration::days(1);
    PeriodRange {
        start: start_of_day(first_of(last_of_previous.year(), last_of_previous.month())),
        end: end_of_day(last_of_previous),
        label: month_label(last_of_previous),
    }
}

/// Boundaries of the named period, evaluated at `now`.
///
/// The default end is `now` clamped to the end of its calendar day.
/// `custom` uses the supplied bounds (start clamped to day-start, end to
/// day-end); when either custom bound is missing it silently falls back
/// to the month rule, mirroring the dashboard's historical behavior.
pub fn period_range_at(
    period: PeriodType,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
    now: NaiveDateTime,
) -> PeriodRange {
    let today = now.date();
    match period {
        PeriodType::Week => PeriodRange {
            start: start_of_day(today - Duration::days(7)),
            end: end_of_day(today),
            label: "Última Semana".to_string(),
        },
        PeriodType::Month => current_month_range(today),
        PeriodType::Quarter => {
            let index = today.month0() / 3;
            let (start, _) = quarter_bounds(today.year(), index);
            PeriodRange {
                start: start_of_day(start),
                end: end_of_day(today),
                label: format!("Trimestre {} {}", index + 1, today.year()),
            }
        }
        PeriodType::Semester => {
            let index = today.month0() / 6;
            let (start, _) = semester_bounds(today.year(), index);
            PeriodRange {
                start: start_of_day(start),
                end: end_of_day(today),
                label: format!("Semestre {} {}", index + 1, today.year()),
            }
        }
        PeriodType::Year => PeriodRange {
            start: start_of_day(first_of(today.year(), 1)),
            end: end_of_day(today),
            label: format!("Año {}", today.year()),
        },
        PeriodType::Custom => match (custom_start, custom_end) {
            (Some(start), Some(end)) => PeriodRange {
                start: start_of_day(start),
                end: end_of_day(end),
                label: span_label(start, end),
            },
            _ => current_month_range(today),
        },
    }
}

/// Contiguous, non-overlapping, equal-duration predecessor of the named
/// period, evaluated at `now`.
///
/// Calendar periods return the entire previous calendar unit, wrapping to
/// the prior year when the current one is the first of the year. `custom`
/// places an equal-length window ending the day before the custom start;
/// with either bound missing it falls back to the previous calendar month.
pub fn previous_period_at(
    period: PeriodType,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
    now: NaiveDateTime,
) -> PeriodRange {
    let today = now.date();
    match period {
        PeriodType::Week => {
            let end_day = today - Duration::days(7);
            PeriodRange {
                start: start_of_day(end_day - Duration::days(7)),
                end: end_of_day(end_day),
                label: "Semana Anterior".to_string(),
            }
        }
        PeriodType::Month => previous_month_range(today),
        PeriodType::Quarter => {
            let index = today.month0() / 3;
            let (year, prev_index) = if index == 0 {
                (today.year() - 1, 3)
            } else {
                (today.year(), index - 1)
            };
            let (start, end) = quarter_bounds(year, prev_index);
            PeriodRange {
                start: start_of_day(start),
                end: end_of_day(end),
                label: format!("Trimestre {} {}", prev_index + 1, year),
            }
        }
        PeriodType::Semester => {
            let index = today.month0() / 6;
            let (year, prev_index) = if index == 0 {
                (today.year() - 1, 1)
            } else {
                (today.year(), index - 1)
            };
            let (start, end) = semester_bounds(year, prev_index);
            PeriodRange {
                start: start_of_day(start),
                end: end_of_day(end),
                label: format!("Semestre {} {}", prev_index + 1, year),
            }
        }
        PeriodType::Year => {
            let year = today.year() - 1;
            PeriodRange {
                start: start_of_day(first_of(year, 1)),
                end: end_of_day(first_of(year + 1, 1) - Duration::days(1)),
                label: format!("Año {}", year),
            }
        }
        PeriodType::Custom => match (custom_start, custom_end) {
            (Some(start), Some(end)) => {
                let span_days = (end - start).num_days().max(0);
                let previous_end = start - Duration::days(1);
                let previous_start = previous_end - Duration::days(span_days);
                PeriodRange {
                    start: start_of_day(previous_start),
                    end: end_of_day(previous_end),
                    label: span_label(previous_start, previous_end),
                }
            }
            _ => previous_month_range(today),
        },
    }
}

/// [`period_range_at`] evaluated at the local wall clock.
pub fn period_range(
    period: PeriodType,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
) -> PeriodRange {
    period_range_at(period, custom_start, custom_end, Local::now().naive_local())
}

/// [`previous_period_at`] evaluated at the local wall clock.
pub fn previous_period(
    period: PeriodType,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
) -> PeriodRange {
    previous_period_at(period, custom_start, custom_end, Local::now().naive_local())
}
