//! Result shapes for period-over-period comparison.

use serde::{Deserialize, Serialize};

/// Signed delta between a current and a previous value.
///
/// Exactly one of the three flags is true, derived strictly from the sign
/// of `value`; `is_neutral` holds iff `value == 0`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeIndicator {
    pub value: f64,
    /// Percentage change relative to `previous`; when `previous` is 0 the
    /// convention is 100 for any growth and 0 otherwise.
    pub percentage: f64,
    pub is_positive: bool,
    pub is_negative: bool,
    pub is_neutral: bool,
}

/// One row of an outer-join comparison between two dimensional tables.
///
/// A key present only in the previous period carries `current: None` and a
/// fully negative change; a key present only in the current period carries
/// `previous: None` and a +100% change.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow<T> {
    pub key: String,
    pub current: Option<T>,
    pub previous: Option<T>,
    pub change: ChangeIndicator,
}

/// Change indicators for every sales summary metric.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesComparison {
    pub total_sales: ChangeIndicator,
    pub total_boxes: ChangeIndicator,
    pub total_pallets: ChangeIndicator,
    pub average_boxes_per_sale: ChangeIndicator,
    pub average_pallets_per_sale: ChangeIndicator,
}

/// Change indicators for every production summary metric.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionComparison {
    pub total_boxes: ChangeIndicator,
    pub total_pallets: ChangeIndicator,
    pub average_efficiency: ChangeIndicator,
    pub active_days: ChangeIndicator,
}
