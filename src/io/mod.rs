pub mod input;
pub mod output;

pub use input::{load_metrics, load_sales};
pub use output::{create_writer, OutputFormat, ReportWriter};
