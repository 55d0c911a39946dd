use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::aggregation::TemporalGranularity;
use crate::io::OutputFormat;
use crate::period::PeriodType;

#[derive(Parser, Debug)]
#[command(name = "packmetrics")]
#[command(about = "Period-based production and sales reporting", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate production telemetry for a period
    Production {
        /// Metrics JSON file (array of daily metric records)
        #[arg(long, env = "PACKMETRICS_METRICS")]
        metrics: PathBuf,

        /// Reporting period
        #[arg(short, long, value_enum, default_value = "month")]
        period: PeriodType,

        /// Custom period start (YYYY-MM-DD), used with --period custom
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Custom period end (YYYY-MM-DD), used with --period custom
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Temporal bucket width
        #[arg(long, value_enum, default_value = "week")]
        group_by: TemporalGranularity,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Aggregate sales for a period
    Sales {
        /// Sales JSON file (array of sale records)
        #[arg(long, env = "PACKMETRICS_SALES")]
        sales: PathBuf,

        /// Reporting period
        #[arg(short, long, value_enum, default_value = "month")]
        period: PeriodType,

        /// Custom period start (YYYY-MM-DD), used with --period custom
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Custom period end (YYYY-MM-DD), used with --period custom
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Temporal bucket width
        #[arg(long, value_enum, default_value = "day")]
        group_by: TemporalGranularity,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare a period against its predecessor
    Compare {
        /// Metrics JSON file; omit to skip the production section
        #[arg(long, env = "PACKMETRICS_METRICS")]
        metrics: Option<PathBuf>,

        /// Sales JSON file; omit to skip the sales section
        #[arg(long, env = "PACKMETRICS_SALES")]
        sales: Option<PathBuf>,

        /// Reporting period
        #[arg(short, long, value_enum, default_value = "month")]
        period: PeriodType,

        /// Custom period start (YYYY-MM-DD), used with --period custom
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Custom period end (YYYY-MM-DD), used with --period custom
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
