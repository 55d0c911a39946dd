use anyhow::Result;
use clap::Parser;
use packmetrics::cli::{Cli, Commands};
use packmetrics::commands;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Production {
            metrics,
            period,
            from,
            to,
            group_by,
            format,
            output,
        } => commands::production::run(commands::production::ProductionConfig {
            metrics_path: metrics,
            period,
            from,
            to,
            group_by,
            format,
            output,
        }),
        Commands::Sales {
            sales,
            period,
            from,
            to,
            group_by,
            format,
            output,
        } => commands::sales::run(commands::sales::SalesConfig {
            sales_path: sales,
            period,
            from,
            to,
            group_by,
            format,
            output,
        }),
        Commands::Compare {
            metrics,
            sales,
            period,
            from,
            to,
            format,
            output,
        } => commands::compare::run(commands::compare::CompareConfig {
            metrics_path: metrics,
            sales_path: sales,
            period,
            from,
            to,
            format,
            output,
        }),
    }
}
