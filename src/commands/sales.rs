use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use crate::aggregation::TemporalGranularity;
use crate::io::{create_writer, load_sales, OutputFormat};
use crate::period::{period_range, PeriodType};
use crate::report::build_sales_report;

pub struct SalesConfig {
    pub sales_path: PathBuf,
    pub period: PeriodType,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub group_by: TemporalGranularity,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

pub fn run(config: SalesConfig) -> Result<()> {
    let sales = load_sales(&config.sales_path)?;
    let range = period_range(config.period, config.from, config.to);
    let report = build_sales_report(&sales, &range, config.group_by);
    let mut writer = create_writer(config.format, config.output.as_deref())?;
    writer.write_sales(&report)
}
