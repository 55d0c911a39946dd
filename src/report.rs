//! Report envelopes: the period window plus everything computed inside it.
//!
//! These are plain data with no references back into the engine, safe to
//! serialize or log as-is.

use serde::{Deserialize, Serialize};

use crate::aggregation::production::{
    aggregate_by_calibre, aggregate_by_horario, aggregate_by_operario, aggregate_by_temporal_period,
    calculate_summary, filter_metrics_by_period,
};
use crate::aggregation::sales::{
    aggregate_by_customer, aggregate_by_state, aggregate_by_temporal_period as sales_temporal,
    aggregate_by_type, calculate_sales_summary, filter_sales_by_period,
};
use crate::aggregation::TemporalGranularity;
use crate::comparison::{
    compare_aggregated_data, compare_production_periods, compare_sales_periods, ComparisonRow,
    ProductionComparison, SalesComparison,
};
use crate::core::{
    CalibreRow, CustomerRow, HorarioRow, Metric, OperarioRow, ProductionSummary, Sale,
    SaleStateRow, SaleTypeRow, SalesSummary, SalesTemporalRow, TemporalRow,
};
use crate::period::PeriodRange;

/// Full production report for one period.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionReport {
    pub period: PeriodRange,
    pub summary: ProductionSummary,
    pub by_operario: Vec<OperarioRow>,
    pub by_calibre: Vec<CalibreRow>,
    pub by_horario: Vec<HorarioRow>,
    pub temporal: Vec<TemporalRow>,
}

/// Full sales report for one period.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: PeriodRange,
    pub summary: SalesSummary,
    pub by_customer: Vec<CustomerRow>,
    pub by_type: Vec<SaleTypeRow>,
    pub by_state: Vec<SaleStateRow>,
    pub temporal: Vec<SalesTemporalRow>,
}

/// Production side of a period-over-period comparison.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionComparisonSection {
    pub current: ProductionSummary,
    pub previous: ProductionSummary,
    pub changes: ProductionComparison,
    pub by_operario: Vec<ComparisonRow<OperarioRow>>,
}

/// Sales side of a period-over-period comparison.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesComparisonSection {
    pub current: SalesSummary,
    pub previous: SalesSummary,
    pub changes: SalesComparison,
    pub by_customer: Vec<ComparisonRow<CustomerRow>>,
}

/// Current-versus-previous report across both record sources.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub current_period: PeriodRange,
    pub previous_period: PeriodRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<ProductionComparisonSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales: Option<SalesComparisonSection>,
}

/// Filter metrics into the range and aggregate every production dimension.
pub fn build_production_report(
    metrics: &[Metric],
    range: &PeriodRange,
    granularity: TemporalGranularity,
) -> ProductionReport {
    let filtered = filter_metrics_by_period(metrics, range);
    ProductionReport {
        period: range.clone(),
        summary: calculate_summary(&filtered),
        by_operario: aggregate_by_operario(&filtered),
        by_calibre: aggregate_by_calibre(&filtered),
        by_horario: aggregate_by_horario(&filtered),
        temporal: aggregate_by_temporal_period(&filtered, granularity),
    }
}

/// Filter sales into the range and aggregate every sales dimension.
pub fn build_sales_report(
    sales: &[Sale],
    range: &PeriodRange,
    granularity: TemporalGranularity,
) -> SalesReport {
    let filtered = filter_sales_by_period(sales, range);
    SalesReport {
        period: range.clone(),
        summary: calculate_sales_summary(&filtered),
        by_customer: aggregate_by_customer(&filtered),
        by_type: aggregate_by_type(&filtered),
        by_state: aggregate_by_state(&filtered),
        temporal: sales_temporal(&filtered, granularity),
    }
}

/// Aggregate both periods of production telemetry and compare them,
/// including the per-operario outer join.
pub fn build_production_comparison(
    metrics: &[Metric],
    current: &PeriodRange,
    previous: &PeriodRange,
) -> ProductionComparisonSection {
    let current_metrics = filter_metrics_by_period(metrics, current);
    let previous_metrics = filter_metrics_by_period(metrics, previous);
    let current_summary = calculate_summary(&current_metrics);
    let previous_summary = calculate_summary(&previous_metrics);
    let by_operario = compare_aggregated_data(
        &aggregate_by_operario(&current_metrics),
        &aggregate_by_operario(&previous_metrics),
        |row: &OperarioRow| row.operario.clone(),
        |row: &OperarioRow| row.total_boxes,
    );
    ProductionComparisonSection {
        changes: compare_production_periods(&current_summary, &previous_summary),
        current: current_summary,
        previous: previous_summary,
        by_operario,
    }
}

/// Aggregate both periods of sales and compare them, including the
/// per-customer outer join.
pub fn build_sales_comparison(
    sales: &[Sale],
    current: &PeriodRange,
    previous: &PeriodRange,
) -> SalesComparisonSection {
    let current_sales = filter_sales_by_period(sales, current);
    let previous_sales = filter_sales_by_period(sales, previous);
    let current_summary = calculate_sales_summary(&current_sales);
    let previous_summary = calculate_sales_summary(&previous_sales);
    let by_customer = compare_aggregated_data(
        &aggregate_by_customer(&current_sales),
        &aggregate_by_customer(&previous_sales),
        |row: &CustomerRow| row.customer_id.clone(),
        |row: &CustomerRow| row.total_sales as f64,
    );
    SalesComparisonSection {
        changes: compare_sales_periods(&current_summary, &previous_summary),
        current: current_summary,
        previous: previous_summary,
        by_customer,
    }
}
