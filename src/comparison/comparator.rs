//! Period-over-period change computation.

use std::collections::BTreeMap;

use crate::comparison::types::{
    ChangeIndicator, ComparisonRow, ProductionComparison, SalesComparison,
};
use crate::core::numeric::safe_number;
use crate::core::{ProductionSummary, SalesSummary};

/// Change indicator between two scalar values.
pub fn calculate_period_change(current: f64, previous: f64) -> ChangeIndicator {
    let value = current - previous;
    let percentage = if previous != 0.0 {
        value / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    };
    ChangeIndicator {
        value,
        percentage,
        is_positive: value > 0.0,
        is_negative: value < 0.0,
        is_neutral: value == 0.0,
    }
}

/// One indicator per sales summary metric, each computed independently.
pub fn compare_sales_periods(current: &SalesSummary, previous: &SalesSummary) -> SalesComparison {
    SalesComparison {
        total_sales: calculate_period_change(current.total_sales as f64, previous.total_sales as f64),
        total_boxes: calculate_period_change(current.total_boxes, previous.total_boxes),
        total_pallets: calculate_period_change(current.total_pallets, previous.total_pallets),
        average_boxes_per_sale: calculate_period_change(
            current.average_boxes_per_sale,
            previous.average_boxes_per_sale,
        ),
        average_pallets_per_sale: calculate_period_change(
            current.average_pallets_per_sale,
            previous.average_pallets_per_sale,
        ),
    }
}

/// One indicator per production summary metric.
pub fn compare_production_periods(
    current: &ProductionSummary,
    previous: &ProductionSummary,
) -> ProductionComparison {
    ProductionComparison {
        total_boxes: calculate_period_change(current.total_boxes, previous.total_boxes),
        total_pallets: calculate_period_change(current.total_pallets, previous.total_pallets),
        average_efficiency: calculate_period_change(
            current.average_efficiency,
            previous.average_efficiency,
        ),
        active_days: calculate_period_change(current.active_days as f64, previous.active_days as f64),
    }
}

/// Outer-join two dimensional tables on a key and compare a value field.
///
/// The join runs over the union of keys from both sides; rows come back
/// sorted by key so the result never depends on either input's order.
pub fn compare_aggregated_data<T, K, V>(
    current: &[T],
    previous: &[T],
    key_of: K,
    value_of: V,
) -> Vec<ComparisonRow<T>>
where
    T: Clone,
    K: Fn(&T) -> String,
    V: Fn(&T) -> f64,
{
    let current_map: BTreeMap<String, &T> =
        current.iter().map(|item| (key_of(item), item)).collect();
    let previous_map: BTreeMap<String, &T> =
        previous.iter().map(|item| (key_of(item), item)).collect();

    let mut keys: Vec<&String> = current_map.keys().chain(previous_map.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .map(|key| {
            let current_item = current_map.get(key).copied();
            let previous_item = previous_map.get(key).copied();
            let change = calculate_period_change(
                safe_number(current_item.map(&value_of)),
                safe_number(previous_item.map(&value_of)),
            );
            ComparisonRow {
                key: key.clone(),
                current: current_item.cloned(),
                previous: previous_item.cloned(),
                change,
            }
        })
        .collect()
}
