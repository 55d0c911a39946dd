use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use crate::aggregation::TemporalGranularity;
use crate::io::{create_writer, load_metrics, OutputFormat};
use crate::period::{period_range, PeriodType};
use crate::report::build_production_report;

pub struct ProductionConfig {
    pub metrics_path: PathBuf,
    pub period: PeriodType,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub group_by: TemporalGranularity,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

pub fn run(config: ProductionConfig) -> Result<()> {
    let metrics = load_metrics(&config.metrics_path)?;
    let range = period_range(config.period, config.from, config.to);
    let report = build_production_report(&metrics, &range, config.group_by);
    let mut writer = create_writer(config.format, config.output.as_deref())?;
    writer.write_production(&report)
}
