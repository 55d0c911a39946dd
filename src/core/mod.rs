pub mod dates;
pub mod numeric;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::core::dates::parse_day;
use crate::core::numeric::{lenient_f64, lenient_f64_map, lenient_opt_f64};

/// Kind of daily aggregate record produced by the telemetry exporter.
///
/// Unknown kinds deserialize to [`MetricType::Unknown`] and are ignored by
/// every production aggregation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MetricType {
    ProductionDaily,
    InventorySnapshot,
    #[default]
    Unknown,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::ProductionDaily => "PRODUCTION_DAILY",
            MetricType::InventorySnapshot => "INVENTORY_SNAPSHOT",
            MetricType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "PRODUCTION_DAILY" => Ok(MetricType::ProductionDaily),
            "INVENTORY_SNAPSHOT" => Ok(MetricType::InventorySnapshot),
            _ => Err(()),
        }
    }
}

impl Serialize for MetricType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Daily dimension breakdowns carried inside a metric record.
///
/// The dimension maps are open-ended: operario, calibre and shift keys are
/// data-driven, not a closed schema.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricData {
    #[serde(deserialize_with = "lenient_f64")]
    pub total_boxes: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_pallets: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub efficiency: f64,
    #[serde(deserialize_with = "lenient_f64_map")]
    pub boxes_by_operario: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient_f64_map")]
    pub boxes_by_calibre: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient_f64_map")]
    pub boxes_by_shift: BTreeMap<String, f64>,
    #[serde(
        deserialize_with = "lenient_f64_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub by_location: BTreeMap<String, f64>,
}

/// One immutable daily aggregate from the telemetry provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Metric {
    pub metric_type: MetricType,
    pub date_key: Option<String>,
    /// ISO date; grouping prefers this field, falling back to `date_key`.
    pub date: Option<String>,
    pub data: MetricData,
    pub calculated_at: Option<String>,
    pub is_final: bool,
}

impl Metric {
    /// Grouping key for this record: `date` when present, else `date_key`.
    pub fn day_key(&self) -> Option<&str> {
        non_empty(self.date.as_deref()).or_else(|| non_empty(self.date_key.as_deref()))
    }

    /// Calendar day this record belongs to, if its key parses.
    pub fn day(&self) -> Option<NaiveDate> {
        self.day_key().and_then(parse_day)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Commercial classification of a sale. Unknown or absent values fold to
/// [`SaleType::Venta`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SaleType {
    #[default]
    Venta,
    Reposicion,
    Donacion,
    Inutilizado,
    Racion,
}

impl SaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleType::Venta => "Venta",
            SaleType::Reposicion => "Reposición",
            SaleType::Donacion => "Donación",
            SaleType::Inutilizado => "Inutilizado",
            SaleType::Racion => "Ración",
        }
    }

    pub const ALL: [SaleType; 5] = [
        SaleType::Venta,
        SaleType::Reposicion,
        SaleType::Donacion,
        SaleType::Inutilizado,
        SaleType::Racion,
    ];
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleType {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        SaleType::ALL
            .iter()
            .find(|t| t.as_str() == raw)
            .copied()
            .ok_or(())
    }
}

impl Serialize for SaleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SaleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Lifecycle state of a sale. Unknown or absent values fold to
/// [`SaleState::Draft`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SaleState {
    #[default]
    Draft,
    Confirmed,
    Dispatched,
    PartiallyReturned,
    FullyReturned,
    Completed,
    Cancelled,
}

impl SaleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleState::Draft => "DRAFT",
            SaleState::Confirmed => "CONFIRMED",
            SaleState::Dispatched => "DISPATCHED",
            SaleState::PartiallyReturned => "PARTIALLY_RETURNED",
            SaleState::FullyReturned => "FULLY_RETURNED",
            SaleState::Completed => "COMPLETED",
            SaleState::Cancelled => "CANCELLED",
        }
    }

    pub const ALL: [SaleState; 7] = [
        SaleState::Draft,
        SaleState::Confirmed,
        SaleState::Dispatched,
        SaleState::PartiallyReturned,
        SaleState::FullyReturned,
        SaleState::Completed,
        SaleState::Cancelled,
    ];
}

impl fmt::Display for SaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleState {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        SaleState::ALL
            .iter()
            .find(|s| s.as_str() == raw)
            .copied()
            .ok_or(())
    }
}

impl Serialize for SaleState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SaleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub name: Option<String>,
}

/// One pallet line inside a sale.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleItem {
    pub pallet_id: Option<String>,
    pub box_ids: Vec<String>,
}

/// One immutable order record from the sales provider.
///
/// Box and pallet counts are derived, in priority order: the explicit
/// scalar field, the `items` lines, the legacy id arrays, then zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Sale {
    pub sale_id: Option<String>,
    pub created_at: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_info: Option<CustomerInfo>,
    #[serde(rename = "type")]
    pub sale_type: SaleType,
    pub state: SaleState,
    pub items: Option<Vec<SaleItem>>,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub total_boxes: Option<f64>,
    pub boxes: Option<Vec<String>>,
    pub pallets: Option<Vec<String>>,
}

impl Sale {
    /// Display name for the customer, with the legacy fallback chain.
    pub fn customer_display_name(&self) -> &str {
        non_empty(self.customer_name.as_deref())
            .or_else(|| {
                self.customer_info
                    .as_ref()
                    .and_then(|info| non_empty(info.name.as_deref()))
            })
            .unwrap_or("Sin nombre")
    }

    /// Grouping key for the customer dimension.
    pub fn customer_key(&self) -> &str {
        non_empty(self.customer_id.as_deref()).unwrap_or("unknown")
    }
}

// ---------------------------------------------------------------------------
// Aggregation output shapes
// ---------------------------------------------------------------------------

/// Per-operario production row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperarioRow {
    pub operario: String,
    pub total_boxes: f64,
    /// Prorated share of each day's pallets, rounded after summing.
    pub total_pallets: f64,
    pub days_worked: usize,
    pub average_efficiency: f64,
    /// Share of the grand total within one aggregation call, 0–100.
    pub percentage: f64,
}

/// Per-calibre production row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalibreRow {
    pub calibre: String,
    pub total_boxes: f64,
    pub percentage: f64,
}

/// Per-shift production row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HorarioRow {
    pub shift: String,
    /// Display label, `"Turno {shift}"`.
    pub label: String,
    pub total_boxes: f64,
    pub total_pallets: f64,
    pub average_efficiency: f64,
    pub percentage: f64,
}

/// One time bucket of production volume.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemporalRow {
    pub label: String,
    pub total_boxes: f64,
    pub total_pallets: f64,
    pub average_efficiency: f64,
}

/// Period-wide production totals plus headline breakdowns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSummary {
    pub total_boxes: f64,
    pub total_pallets: f64,
    pub average_efficiency: f64,
    /// Distinct days that actually produced boxes.
    pub active_days: usize,
    pub top_operarios: Vec<OperarioRow>,
    pub top_calibres: Vec<CalibreRow>,
    pub by_shift: Vec<HorarioRow>,
}

/// Per-customer sales row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub customer_id: String,
    pub customer_name: String,
    pub total_sales: usize,
    pub total_boxes: f64,
    pub total_pallets: f64,
    pub percentage: f64,
}

/// Per-type sales row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleTypeRow {
    #[serde(rename = "type")]
    pub sale_type: SaleType,
    pub total_sales: usize,
    pub total_boxes: f64,
    pub total_pallets: f64,
    pub percentage: f64,
}

/// Per-state sales row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleStateRow {
    pub state: SaleState,
    pub total_sales: usize,
    pub total_boxes: f64,
    pub total_pallets: f64,
    pub percentage: f64,
}

/// One time bucket of sales volume.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesTemporalRow {
    pub label: String,
    pub total_sales: usize,
    pub total_boxes: f64,
    pub total_pallets: f64,
}

/// Period-wide sales totals plus headline breakdowns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: usize,
    pub total_boxes: f64,
    pub total_pallets: f64,
    pub average_boxes_per_sale: f64,
    pub average_pallets_per_sale: f64,
    pub top_customers: Vec<CustomerRow>,
    pub by_type: Vec<SaleTypeRow>,
    pub by_state: Vec<SaleStateRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metric_day_prefers_date_over_date_key() {
        let metric = Metric {
            date: Some("2024-03-15".to_string()),
            date_key: Some("2024-01-01".to_string()),
            ..Metric::default()
        };
        assert_eq!(metric.day(), NaiveDate::from_ymd_opt(2024, 3, 15));

        let metric = Metric {
            date: Some("   ".to_string()),
            date_key: Some("2024-01-01".to_string()),
            ..Metric::default()
        };
        assert_eq!(metric.day(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn metric_deserializes_leniently() {
        let metric: Metric = serde_json::from_value(json!({
            "metricType": "PRODUCTION_DAILY",
            "dateKey": "2024-01-01",
            "data": {
                "totalBoxes": "100",
                "totalPallets": 2,
                "efficiency": null,
                "boxesByOperario": {"A": 60, "B": "40"}
            },
            "isFinal": true
        }))
        .unwrap();
        assert_eq!(metric.metric_type, MetricType::ProductionDaily);
        assert_eq!(metric.data.total_boxes, 100.0);
        assert_eq!(metric.data.efficiency, 0.0);
        assert_eq!(metric.data.boxes_by_operario["B"], 40.0);
        assert!(metric.data.boxes_by_calibre.is_empty());
    }

    #[test]
    fn unknown_metric_type_is_tolerated() {
        let metric: Metric =
            serde_json::from_value(json!({"metricType": "SOMETHING_NEW"})).unwrap();
        assert_eq!(metric.metric_type, MetricType::Unknown);
    }

    #[test]
    fn sale_enums_fold_unknowns_to_defaults() {
        let sale: Sale = serde_json::from_value(json!({
            "saleId": "S-1",
            "type": "Trueque",
            "state": null
        }))
        .unwrap();
        assert_eq!(sale.sale_type, SaleType::Venta);
        assert_eq!(sale.state, SaleState::Draft);
    }

    #[test]
    fn sale_enums_round_trip_accented_names() {
        assert_eq!("Reposición".parse(), Ok(SaleType::Reposicion));
        let sale: Sale = serde_json::from_value(json!({"type": "Ración"})).unwrap();
        assert_eq!(sale.sale_type, SaleType::Racion);
        assert_eq!(serde_json::to_value(SaleType::Donacion).unwrap(), "Donación");
    }

    #[test]
    fn customer_name_fallback_chain() {
        let sale = Sale {
            customer_info: Some(CustomerInfo {
                name: Some("Mercado Central".to_string()),
            }),
            ..Sale::default()
        };
        assert_eq!(sale.customer_display_name(), "Mercado Central");

        let sale = Sale {
            customer_name: Some("Distribuidora Sur".to_string()),
            customer_info: Some(CustomerInfo {
                name: Some("ignored".to_string()),
            }),
            ..Sale::default()
        };
        assert_eq!(sale.customer_display_name(), "Distribuidora Sur");

        assert_eq!(Sale::default().customer_display_name(), "Sin nombre");
        assert_eq!(Sale::default().customer_key(), "unknown");
    }
}
