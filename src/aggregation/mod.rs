//! Dimensional aggregation over raw telemetry and sales records.
//!
//! Each aggregator is a pure function over a borrowed slice: inputs are
//! never mutated, outputs are freshly allocated, and grouping runs over
//! ordered maps so identical inputs produce identical output.

pub mod production;
pub mod sales;

use chrono::{Datelike, Duration, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::period::month_name;

/// Bucket width for temporal aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemporalGranularity {
    Day,
    /// Monday-aligned weeks.
    Week,
    Month,
}

impl TemporalGranularity {
    /// First day of the bucket containing `day`.
    pub fn bucket_start(&self, day: NaiveDate) -> NaiveDate {
        match self {
            TemporalGranularity::Day => day,
            TemporalGranularity::Week => {
                day - Duration::days(day.weekday().num_days_from_monday() as i64)
            }
            TemporalGranularity::Month => day.with_day(1).unwrap_or(day),
        }
    }

    /// Display label for the bucket starting at `start`.
    pub fn bucket_label(&self, start: NaiveDate) -> String {
        match self {
            TemporalGranularity::Day => start.format("%d/%m/%Y").to_string(),
            TemporalGranularity::Week => format!("Semana {}", start.format("%d/%m")),
            TemporalGranularity::Month => format!("{} {}", month_name(start.month()), start.year()),
        }
    }
}
