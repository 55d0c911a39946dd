//! Report writers: pretty JSON for machines, tables for terminals.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets, Table};

use crate::comparison::ChangeIndicator;
use crate::period::PeriodRange;
use crate::report::{ComparisonReport, ProductionReport, SalesReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait ReportWriter {
    fn write_production(&mut self, report: &ProductionReport) -> Result<()>;
    fn write_sales(&mut self, report: &SalesReport) -> Result<()>;
    fn write_comparison(&mut self, report: &ComparisonReport) -> Result<()>;
}

/// Open the requested writer over a file or stdout.
pub fn create_writer(format: OutputFormat, output: Option<&Path>) -> Result<Box<dyn ReportWriter>> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create output file: {}", path.display())
        })?)),
        None => Box::new(std::io::stdout()),
    };
    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(sink)),
    })
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_value<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(self.writer, "{json}")?;
        Ok(())
    }
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_production(&mut self, report: &ProductionReport) -> Result<()> {
        self.write_value(report)
    }

    fn write_sales(&mut self, report: &SalesReport) -> Result<()> {
        self.write_value(report)
    }

    fn write_comparison(&mut self, report: &ComparisonReport) -> Result<()> {
        self.write_value(report)
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_period_heading(&mut self, title: &str, period: &PeriodRange) -> Result<()> {
        writeln!(self.writer, "{}", title.bold())?;
        writeln!(
            self.writer,
            "{} ({} a {})",
            period.label.cyan(),
            period.start.format("%d/%m/%Y"),
            period.end.format("%d/%m/%Y")
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_table(&mut self, header: Vec<&str>, rows: Vec<Vec<String>>) -> Result<()> {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_header(header);
        for row in rows {
            table.add_row(row);
        }
        writeln!(self.writer, "{table}")?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn count(value: f64) -> String {
    format!("{value:.0}")
}

fn percentage(value: f64) -> String {
    format!("{value:.1}%")
}

fn change_cell(change: &ChangeIndicator) -> String {
    let text = format!("{:+.0} ({:+.1}%)", change.value, change.percentage);
    if change.is_positive {
        text.green().to_string()
    } else if change.is_negative {
        text.red().to_string()
    } else {
        text.dimmed().to_string()
    }
}

impl<W: Write> ReportWriter for TerminalWriter<W> {
    fn write_production(&mut self, report: &ProductionReport) -> Result<()> {
        self.write_period_heading("Producción", &report.period)?;

        let summary = &report.summary;
        writeln!(
            self.writer,
            "Cajas: {}  Pallets: {}  Eficiencia media: {}  Días activos: {}",
            count(summary.total_boxes).bold(),
            count(summary.total_pallets),
            format!("{:.1}", summary.average_efficiency),
            summary.active_days
        )?;
        writeln!(self.writer)?;

        self.write_table(
            vec!["Operario", "Cajas", "Pallets", "Días", "Eficiencia", "%"],
            report
                .by_operario
                .iter()
                .map(|row| {
                    vec![
                        row.operario.clone(),
                        count(row.total_boxes),
                        count(row.total_pallets),
                        row.days_worked.to_string(),
                        format!("{:.1}", row.average_efficiency),
                        percentage(row.percentage),
                    ]
                })
                .collect(),
        )?;

        self.write_table(
            vec!["Calibre", "Cajas", "%"],
            report
                .by_calibre
                .iter()
                .map(|row| {
                    vec![
                        row.calibre.clone(),
                        count(row.total_boxes),
                        percentage(row.percentage),
                    ]
                })
                .collect(),
        )?;

        self.write_table(
            vec!["Turno", "Cajas", "Pallets", "Eficiencia", "%"],
            report
                .by_horario
                .iter()
                .map(|row| {
                    vec![
                        row.label.clone(),
                        count(row.total_boxes),
                        count(row.total_pallets),
                        format!("{:.1}", row.average_efficiency),
                        percentage(row.percentage),
                    ]
                })
                .collect(),
        )?;

        self.write_table(
            vec!["Período", "Cajas", "Pallets", "Eficiencia"],
            report
                .temporal
                .iter()
                .map(|row| {
                    vec![
                        row.label.clone(),
                        count(row.total_boxes),
                        count(row.total_pallets),
                        format!("{:.1}", row.average_efficiency),
                    ]
                })
                .collect(),
        )
    }

    fn write_sales(&mut self, report: &SalesReport) -> Result<()> {
        self.write_period_heading("Ventas", &report.period)?;

        let summary = &report.summary;
        writeln!(
            self.writer,
            "Ventas: {}  Cajas: {}  Pallets: {}  Cajas/venta: {:.1}  Pallets/venta: {:.1}",
            summary.total_sales.to_string().bold(),
            count(summary.total_boxes),
            count(summary.total_pallets),
            summary.average_boxes_per_sale,
            summary.average_pallets_per_sale
        )?;
        writeln!(self.writer)?;

        self.write_table(
            vec!["Cliente", "Ventas", "Cajas", "Pallets", "%"],
            report
                .by_customer
                .iter()
                .map(|row| {
                    vec![
                        row.customer_name.clone(),
                        row.total_sales.to_string(),
                        count(row.total_boxes),
                        count(row.total_pallets),
                        percentage(row.percentage),
                    ]
                })
                .collect(),
        )?;

        self.write_table(
            vec!["Tipo", "Ventas", "Cajas", "%"],
            report
                .by_type
                .iter()
                .map(|row| {
                    vec![
                        row.sale_type.to_string(),
                        row.total_sales.to_string(),
                        count(row.total_boxes),
                        percentage(row.percentage),
                    ]
                })
                .collect(),
        )?;

        self.write_table(
            vec!["Estado", "Ventas", "Cajas", "%"],
            report
                .by_state
                .iter()
                .map(|row| {
                    vec![
                        row.state.to_string(),
                        row.total_sales.to_string(),
                        count(row.total_boxes),
                        percentage(row.percentage),
                    ]
                })
                .collect(),
        )?;

        self.write_table(
            vec!["Período", "Ventas", "Cajas", "Pallets"],
            report
                .temporal
                .iter()
                .map(|row| {
                    vec![
                        row.label.clone(),
                        row.total_sales.to_string(),
                        count(row.total_boxes),
                        count(row.total_pallets),
                    ]
                })
                .collect(),
        )
    }

    fn write_comparison(&mut self, report: &ComparisonReport) -> Result<()> {
        writeln!(self.writer, "{}", "Comparación de períodos".bold())?;
        writeln!(
            self.writer,
            "{} vs {}",
            report.current_period.label.cyan(),
            report.previous_period.label.cyan()
        )?;
        writeln!(self.writer)?;

        if let Some(production) = &report.production {
            writeln!(self.writer, "{}", "Producción".bold())?;
            self.write_table(
                vec!["Métrica", "Actual", "Anterior", "Cambio"],
                vec![
                    vec![
                        "Cajas".to_string(),
                        count(production.current.total_boxes),
                        count(production.previous.total_boxes),
                        change_cell(&production.changes.total_boxes),
                    ],
                    vec![
                        "Pallets".to_string(),
                        count(production.current.total_pallets),
                        count(production.previous.total_pallets),
                        change_cell(&production.changes.total_pallets),
                    ],
                    vec![
                        "Eficiencia".to_string(),
                        format!("{:.1}", production.current.average_efficiency),
                        format!("{:.1}", production.previous.average_efficiency),
                        change_cell(&production.changes.average_efficiency),
                    ],
                    vec![
                        "Días activos".to_string(),
                        production.current.active_days.to_string(),
                        production.previous.active_days.to_string(),
                        change_cell(&production.changes.active_days),
                    ],
                ],
            )?;

            self.write_table(
                vec!["Operario", "Cajas actuales", "Cajas anteriores", "Cambio"],
                production
                    .by_operario
                    .iter()
                    .map(|row| {
                        vec![
                            row.key.clone(),
                            row.current
                                .as_ref()
                                .map_or_else(|| "-".to_string(), |r| count(r.total_boxes)),
                            row.previous
                                .as_ref()
                                .map_or_else(|| "-".to_string(), |r| count(r.total_boxes)),
                            change_cell(&row.change),
                        ]
                    })
                    .collect(),
            )?;
        }

        if let Some(sales) = &report.sales {
            writeln!(self.writer, "{}", "Ventas".bold())?;
            self.write_table(
                vec!["Métrica", "Actual", "Anterior", "Cambio"],
                vec![
                    vec![
                        "Ventas".to_string(),
                        sales.current.total_sales.to_string(),
                        sales.previous.total_sales.to_string(),
                        change_cell(&sales.changes.total_sales),
                    ],
                    vec![
                        "Cajas".to_string(),
                        count(sales.current.total_boxes),
                        count(sales.previous.total_boxes),
                        change_cell(&sales.changes.total_boxes),
                    ],
                    vec![
                        "Pallets".to_string(),
                        count(sales.current.total_pallets),
                        count(sales.previous.total_pallets),
                        change_cell(&sales.changes.total_pallets),
                    ],
                    vec![
                        "Cajas/venta".to_string(),
                        format!("{:.1}", sales.current.average_boxes_per_sale),
                        format!("{:.1}", sales.previous.average_boxes_per_sale),
                        change_cell(&sales.changes.average_boxes_per_sale),
                    ],
                    vec![
                        "Pallets/venta".to_string(),
                        format!("{:.1}", sales.current.average_pallets_per_sale),
                        format!("{:.1}", sales.previous.average_pallets_per_sale),
                        change_cell(&sales.changes.average_pallets_per_sale),
                    ],
                ],
            )?;

            self.write_table(
                vec!["Cliente", "Ventas actuales", "Ventas anteriores", "Cambio"],
                sales
                    .by_customer
                    .iter()
                    .map(|row| {
                        vec![
                            row.current
                                .as_ref()
                                .or(row.previous.as_ref())
                                .map_or_else(|| row.key.clone(), |r| r.customer_name.clone()),
                            row.current
                                .as_ref()
                                .map_or_else(|| "-".to_string(), |r| r.total_sales.to_string()),
                            row.previous
                                .as_ref()
                                .map_or_else(|| "-".to_string(), |r| r.total_sales.to_string()),
                            change_cell(&row.change),
                        ]
                    })
                    .collect(),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::TemporalGranularity;
    use crate::core::{Metric, MetricData, MetricType};
    use crate::period::{period_range_at, PeriodType};
    use crate::report::build_production_report;
    use chrono::NaiveDate;

    fn sample_report() -> ProductionReport {
        let metrics = vec![Metric {
            metric_type: MetricType::ProductionDaily,
            date: Some("2024-03-10".to_string()),
            data: MetricData {
                total_boxes: 100.0,
                total_pallets: 4.0,
                efficiency: 82.0,
                boxes_by_operario: [("A".to_string(), 100.0)].into_iter().collect(),
                boxes_by_shift: [("1".to_string(), 100.0)].into_iter().collect(),
                ..MetricData::default()
            },
            ..Metric::default()
        }];
        let range = period_range_at(
            PeriodType::Month,
            None,
            None,
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        build_production_report(&metrics, &range, TemporalGranularity::Week)
    }

    #[test]
    fn json_writer_emits_valid_json() {
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer)
            .write_production(&sample_report())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["period"]["label"], "Marzo 2024");
        assert_eq!(parsed["summary"]["totalBoxes"], 100.0);
    }

    #[test]
    fn terminal_writer_renders_tables() {
        let mut buffer = Vec::new();
        TerminalWriter::new(&mut buffer)
            .write_production(&sample_report())
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Operario"));
        assert!(text.contains("Turno 1"));
    }
}
