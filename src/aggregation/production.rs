//! Dimensional aggregation over daily production telemetry.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::aggregation::TemporalGranularity;
use crate::core::dates::start_of_day;
use crate::core::{
    CalibreRow, HorarioRow, Metric, MetricType, OperarioRow, ProductionSummary, TemporalRow,
};
use crate::period::PeriodRange;

/// Number of rows kept in summary leaderboards.
const TOP_ROWS: usize = 5;

/// Keep the records whose day falls inside the range, bounds inclusive.
///
/// Records without a parseable date are excluded; a malformed record never
/// aborts the report.
pub fn filter_metrics_by_period(metrics: &[Metric], range: &PeriodRange) -> Vec<Metric> {
    metrics
        .iter()
        .filter(|metric| match metric.day() {
            Some(day) => range.contains(start_of_day(day)),
            None => {
                debug!(
                    "skipping metric without parseable date (dateKey={:?})",
                    metric.date_key
                );
                false
            }
        })
        .cloned()
        .collect()
}

fn production_records(metrics: &[Metric]) -> impl Iterator<Item = &Metric> {
    metrics
        .iter()
        .filter(|m| m.metric_type == MetricType::ProductionDaily)
}

/// Prorated share of a day's pallets for `boxes` out of `total_boxes`.
/// Days that produced no boxes contribute nothing.
fn prorated_pallets(total_pallets: f64, boxes: f64, total_boxes: f64) -> f64 {
    if total_boxes > 0.0 {
        total_pallets * (boxes / total_boxes)
    } else {
        0.0
    }
}

fn share_of(total: f64, grand_total: f64) -> f64 {
    if grand_total > 0.0 {
        total / grand_total * 100.0
    } else {
        0.0
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

fn by_volume_desc(a_boxes: f64, b_boxes: f64, a_key: &str, b_key: &str) -> Ordering {
    b_boxes
        .partial_cmp(&a_boxes)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_key.cmp(b_key))
}

#[derive(Default)]
struct DimensionAcc {
    boxes: f64,
    pallets: f64,
    days: BTreeSet<String>,
    efficiency_sum: f64,
    efficiency_days: usize,
}

impl DimensionAcc {
    fn absorb(&mut self, boxes: f64, data_pallets: f64, data_boxes: f64, efficiency: f64) {
        self.boxes += boxes;
        self.pallets += prorated_pallets(data_pallets, boxes, data_boxes);
        if efficiency > 0.0 {
            self.efficiency_sum += efficiency;
            self.efficiency_days += 1;
        }
    }
}

/// Aggregate production by operario: boxes, prorated pallets, days worked,
/// mean efficiency over positive-efficiency days, and share of the total.
/// Rows are sorted by volume, descending.
pub fn aggregate_by_operario(metrics: &[Metric]) -> Vec<OperarioRow> {
    let mut acc: BTreeMap<String, DimensionAcc> = BTreeMap::new();
    for metric in production_records(metrics) {
        let data = &metric.data;
        for (operario, &boxes) in &data.boxes_by_operario {
            let entry = acc.entry(operario.clone()).or_default();
            entry.absorb(boxes, data.total_pallets, data.total_boxes, data.efficiency);
            if boxes > 0.0 {
                if let Some(key) = metric.day_key() {
                    entry.days.insert(key.to_string());
                }
            }
        }
    }

    let grand_total: f64 = acc.values().map(|a| a.boxes).sum();
    let mut rows: Vec<OperarioRow> = acc
        .into_iter()
        .map(|(operario, a)| OperarioRow {
            operario,
            total_boxes: a.boxes,
            total_pallets: a.pallets.round(),
            days_worked: a.days.len(),
            average_efficiency: mean(a.efficiency_sum, a.efficiency_days),
            percentage: share_of(a.boxes, grand_total),
        })
        .collect();
    rows.sort_by(|a, b| by_volume_desc(a.total_boxes, b.total_boxes, &a.operario, &b.operario));
    rows
}

/// Aggregate production by calibre. Rows are sorted by volume, descending.
pub fn aggregate_by_calibre(metrics: &[Metric]) -> Vec<CalibreRow> {
    let mut acc: BTreeMap<String, f64> = BTreeMap::new();
    for metric in production_records(metrics) {
        for (calibre, &boxes) in &metric.data.boxes_by_calibre {
            *acc.entry(calibre.clone()).or_default() += boxes;
        }
    }

    let grand_total: f64 = acc.values().sum();
    let mut rows: Vec<CalibreRow> = acc
        .into_iter()
        .map(|(calibre, boxes)| CalibreRow {
            calibre,
            total_boxes: boxes,
            percentage: share_of(boxes, grand_total),
        })
        .collect();
    rows.sort_by(|a, b| by_volume_desc(a.total_boxes, b.total_boxes, &a.calibre, &b.calibre));
    rows
}

/// Aggregate production by shift.
///
/// Unlike the volume-ordered dimensions, shift rows are sorted ascending
/// by the numeric shift id so "Turno 1" always precedes "Turno 2"
/// regardless of volume; non-numeric ids sort after numeric ones.
pub fn aggregate_by_horario(metrics: &[Metric]) -> Vec<HorarioRow> {
    let mut acc: BTreeMap<String, DimensionAcc> = BTreeMap::new();
    for metric in production_records(metrics) {
        let data = &metric.data;
        for (shift, &boxes) in &data.boxes_by_shift {
            acc.entry(shift.clone()).or_default().absorb(
                boxes,
                data.total_pallets,
                data.total_boxes,
                data.efficiency,
            );
        }
    }

    let grand_total: f64 = acc.values().map(|a| a.boxes).sum();
    let mut rows: Vec<HorarioRow> = acc
        .into_iter()
        .map(|(shift, a)| HorarioRow {
            label: format!("Turno {shift}"),
            shift,
            total_boxes: a.boxes,
            total_pallets: a.pallets.round(),
            average_efficiency: mean(a.efficiency_sum, a.efficiency_days),
            percentage: share_of(a.boxes, grand_total),
        })
        .collect();
    rows.sort_by(|a, b| shift_order(&a.shift, &b.shift));
    rows
}

fn shift_order(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
    .then_with(|| a.cmp(b))
}

#[derive(Default)]
struct BucketAcc {
    boxes: f64,
    pallets: f64,
    efficiency_sum: f64,
    efficiency_days: usize,
}

/// Bucket production volume by day, Monday-aligned week, or month.
/// Rows come back in ascending bucket-date order.
pub fn aggregate_by_temporal_period(
    metrics: &[Metric],
    granularity: TemporalGranularity,
) -> Vec<TemporalRow> {
    let mut acc: BTreeMap<chrono::NaiveDate, BucketAcc> = BTreeMap::new();
    for metric in production_records(metrics) {
        let Some(day) = metric.day() else { continue };
        let data = &metric.data;
        let bucket = acc.entry(granularity.bucket_start(day)).or_default();
        bucket.boxes += data.total_boxes;
        bucket.pallets += data.total_pallets;
        if data.efficiency > 0.0 {
            bucket.efficiency_sum += data.efficiency;
            bucket.efficiency_days += 1;
        }
    }

    acc.into_iter()
        .map(|(start, bucket)| TemporalRow {
            label: granularity.bucket_label(start),
            total_boxes: bucket.boxes,
            total_pallets: bucket.pallets,
            average_efficiency: mean(bucket.efficiency_sum, bucket.efficiency_days),
        })
        .collect()
}

/// Period-wide totals plus the headline breakdowns: top operarios and
/// calibres, and the full shift table.
pub fn calculate_summary(metrics: &[Metric]) -> ProductionSummary {
    let mut total_boxes = 0.0;
    let mut total_pallets = 0.0;
    let mut efficiency_sum = 0.0;
    let mut efficiency_days = 0usize;
    let mut active_days: BTreeSet<String> = BTreeSet::new();

    for metric in production_records(metrics) {
        let data = &metric.data;
        total_boxes += data.total_boxes;
        total_pallets += data.total_pallets;
        if data.efficiency > 0.0 {
            efficiency_sum += data.efficiency;
            efficiency_days += 1;
        }
        if data.total_boxes > 0.0 {
            if let Some(key) = metric.day_key() {
                active_days.insert(key.to_string());
            }
        }
    }

    let mut top_operarios = aggregate_by_operario(metrics);
    top_operarios.truncate(TOP_ROWS);
    let mut top_calibres = aggregate_by_calibre(metrics);
    top_calibres.truncate(TOP_ROWS);

    ProductionSummary {
        total_boxes,
        total_pallets,
        average_efficiency: mean(efficiency_sum, efficiency_days),
        active_days: active_days.len(),
        top_operarios,
        top_calibres,
        by_shift: aggregate_by_horario(metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricData;
    use crate::period::{period_range_at, PeriodType};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn production_metric(date: &str, data: MetricData) -> Metric {
        Metric {
            metric_type: MetricType::ProductionDaily,
            date: Some(date.to_string()),
            data,
            ..Metric::default()
        }
    }

    fn boxes(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn operario_aggregation_orders_by_volume() {
        let metrics = vec![production_metric(
            "2024-01-01",
            MetricData {
                total_boxes: 100.0,
                total_pallets: 2.0,
                efficiency: 80.0,
                boxes_by_operario: boxes(&[("A", 60.0), ("B", 40.0)]),
                ..MetricData::default()
            },
        )];

        let rows = aggregate_by_operario(&metrics);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].operario, "A");
        assert_eq!(rows[0].total_boxes, 60.0);
        assert_eq!(rows[0].percentage, 60.0);
        assert_eq!(rows[0].days_worked, 1);
        assert_eq!(rows[0].average_efficiency, 80.0);
        assert_eq!(rows[1].operario, "B");
        assert_eq!(rows[1].total_boxes, 40.0);
        assert_eq!(rows[1].percentage, 40.0);
    }

    #[test]
    fn pallets_are_prorated_and_rounded() {
        let metrics = vec![
            production_metric(
                "2024-01-01",
                MetricData {
                    total_boxes: 100.0,
                    total_pallets: 3.0,
                    boxes_by_operario: boxes(&[("A", 50.0), ("B", 50.0)]),
                    ..MetricData::default()
                },
            ),
            production_metric(
                "2024-01-02",
                MetricData {
                    total_boxes: 80.0,
                    total_pallets: 2.0,
                    boxes_by_operario: boxes(&[("A", 80.0)]),
                    ..MetricData::default()
                },
            ),
        ];

        let rows = aggregate_by_operario(&metrics);
        let a = rows.iter().find(|r| r.operario == "A").unwrap();
        // 3 * 0.5 + 2 * 1.0 = 3.5, rounded to 4
        assert_eq!(a.total_pallets, 4.0);
        assert_eq!(a.days_worked, 2);
    }

    #[test]
    fn zero_box_day_contributes_no_pallets() {
        let metrics = vec![production_metric(
            "2024-01-01",
            MetricData {
                total_boxes: 0.0,
                total_pallets: 5.0,
                boxes_by_operario: boxes(&[("A", 0.0)]),
                ..MetricData::default()
            },
        )];

        let rows = aggregate_by_operario(&metrics);
        assert_eq!(rows[0].total_pallets, 0.0);
        assert!(rows[0].total_pallets.is_finite());
        assert_eq!(rows[0].days_worked, 0);
        assert_eq!(rows[0].percentage, 0.0);
    }

    #[test]
    fn inventory_snapshots_are_ignored() {
        let metrics = vec![Metric {
            metric_type: MetricType::InventorySnapshot,
            date: Some("2024-01-01".to_string()),
            data: MetricData {
                total_boxes: 500.0,
                boxes_by_operario: boxes(&[("A", 500.0)]),
                ..MetricData::default()
            },
            ..Metric::default()
        }];

        assert!(aggregate_by_operario(&metrics).is_empty());
        assert_eq!(calculate_summary(&metrics).total_boxes, 0.0);
    }

    #[test]
    fn horario_orders_by_numeric_shift_id() {
        let metrics = vec![production_metric(
            "2024-01-01",
            MetricData {
                total_boxes: 30.0,
                boxes_by_shift: boxes(&[("2", 10.0), ("1", 20.0), ("10", 0.0)]),
                ..MetricData::default()
            },
        )];

        let rows = aggregate_by_horario(&metrics);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        // ascending numeric id, not volume and not lexicographic
        assert_eq!(labels, vec!["Turno 1", "Turno 2", "Turno 10"]);
    }

    #[test]
    fn temporal_buckets_sort_ascending() {
        let metrics = vec![
            production_metric(
                "2024-03-15",
                MetricData {
                    total_boxes: 10.0,
                    ..MetricData::default()
                },
            ),
            production_metric(
                "2024-03-04",
                MetricData {
                    total_boxes: 20.0,
                    efficiency: 90.0,
                    ..MetricData::default()
                },
            ),
            production_metric(
                "2024-03-05",
                MetricData {
                    total_boxes: 5.0,
                    efficiency: 70.0,
                    ..MetricData::default()
                },
            ),
        ];

        let weekly = aggregate_by_temporal_period(&metrics, TemporalGranularity::Week);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].label, "Semana 04/03");
        assert_eq!(weekly[0].total_boxes, 25.0);
        assert_eq!(weekly[0].average_efficiency, 80.0);
        assert_eq!(weekly[1].label, "Semana 11/03");

        let monthly = aggregate_by_temporal_period(&metrics, TemporalGranularity::Month);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].label, "Marzo 2024");
        assert_eq!(monthly[0].total_boxes, 35.0);
    }

    #[test]
    fn filter_keeps_range_inclusive_and_drops_unparsable() {
        let range = period_range_at(
            PeriodType::Custom,
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
            NaiveDate::from_ymd_opt(2024, 2, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let metrics = vec![
            production_metric("2024-01-01", MetricData::default()),
            production_metric("2024-01-31", MetricData::default()),
            production_metric("2024-02-01", MetricData::default()),
            production_metric("not-a-date", MetricData::default()),
            Metric::default(),
        ];

        let kept = filter_metrics_by_period(&metrics, &range);
        assert_eq!(kept.len(), 2);
        // input untouched
        assert_eq!(metrics.len(), 5);
    }

    #[test]
    fn summary_slices_top_five() {
        let entries: Vec<(String, f64)> = (0..8)
            .map(|i| (format!("OP{i}"), 10.0 + i as f64))
            .collect();
        let refs: Vec<(&str, f64)> = entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let metrics = vec![production_metric(
            "2024-01-01",
            MetricData {
                total_boxes: refs.iter().map(|(_, v)| v).sum(),
                total_pallets: 4.0,
                boxes_by_operario: boxes(&refs),
                boxes_by_calibre: boxes(&[("M", 40.0), ("L", 60.0)]),
                boxes_by_shift: boxes(&[("1", 70.0), ("2", 30.0)]),
                efficiency: 85.0,
                ..MetricData::default()
            },
        )];

        let summary = calculate_summary(&metrics);
        assert_eq!(summary.top_operarios.len(), 5);
        assert_eq!(summary.top_operarios[0].operario, "OP7");
        assert_eq!(summary.top_calibres.len(), 2);
        assert_eq!(summary.by_shift.len(), 2);
        assert_eq!(summary.active_days, 1);
        assert_eq!(summary.average_efficiency, 85.0);
    }

    proptest! {
        #[test]
        fn percentages_conserve_the_total(
            volumes in proptest::collection::btree_map("[a-e]", 0.0f64..10_000.0, 1..6),
        ) {
            let total: f64 = volumes.values().sum();
            let metrics = vec![production_metric(
                "2024-01-01",
                MetricData {
                    total_boxes: total,
                    boxes_by_operario: volumes,
                    ..MetricData::default()
                },
            )];

            let rows = aggregate_by_operario(&metrics);
            let sum: f64 = rows.iter().map(|r| r.percentage).sum();
            if total > 0.0 {
                prop_assert!((sum - 100.0).abs() < 0.01);
            } else {
                prop_assert!(rows.iter().all(|r| r.percentage == 0.0));
            }
        }
    }
}
