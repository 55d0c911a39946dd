use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::io::{create_writer, load_metrics, load_sales, OutputFormat};
use crate::period::{period_range, previous_period, PeriodType};
use crate::report::{build_production_comparison, build_sales_comparison, ComparisonReport};

pub struct CompareConfig {
    pub metrics_path: Option<PathBuf>,
    pub sales_path: Option<PathBuf>,
    pub period: PeriodType,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

pub fn run(config: CompareConfig) -> Result<()> {
    if config.metrics_path.is_none() && config.sales_path.is_none() {
        bail!("nothing to compare: pass --metrics, --sales, or both");
    }

    let current = period_range(config.period, config.from, config.to);
    let previous = previous_period(config.period, config.from, config.to);

    let production = match &config.metrics_path {
        Some(path) => {
            let metrics = load_metrics(path)?;
            Some(build_production_comparison(&metrics, &current, &previous))
        }
        None => None,
    };
    let sales = match &config.sales_path {
        Some(path) => {
            let records = load_sales(path)?;
            Some(build_sales_comparison(&records, &current, &previous))
        }
        None => None,
    };

    let report = ComparisonReport {
        current_period: current,
        previous_period: previous,
        production,
        sales,
    };
    let mut writer = create_writer(config.format, config.output.as_deref())?;
    writer.write_comparison(&report)
}
