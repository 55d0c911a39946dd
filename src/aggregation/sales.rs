//! Dimensional aggregation over sales records.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use log::debug;

use crate::aggregation::TemporalGranularity;
use crate::core::numeric::safe_number;
use crate::core::{
    CustomerRow, Sale, SaleState, SaleStateRow, SaleType, SaleTypeRow, SalesSummary,
    SalesTemporalRow,
};
use crate::period::PeriodRange;

const TOP_ROWS: usize = 5;

/// Box count of a sale, by derivation priority: the explicit scalar,
/// the `items` lines, the legacy `boxes` array, then zero.
pub fn total_boxes_from_sale(sale: &Sale) -> f64 {
    if let Some(total) = sale.total_boxes {
        return safe_number(Some(total));
    }
    if let Some(items) = &sale.items {
        return items.iter().map(|item| item.box_ids.len()).sum::<usize>() as f64;
    }
    sale.boxes.as_ref().map_or(0.0, |boxes| boxes.len() as f64)
}

/// Pallet count of a sale: the number of distinct non-empty `palletId`s
/// across the `items` lines (not the line count), falling back to the
/// legacy `pallets` array, then zero.
pub fn total_pallets_from_sale(sale: &Sale) -> f64 {
    if let Some(items) = &sale.items {
        let distinct: BTreeSet<&str> = items
            .iter()
            .filter_map(|item| item.pallet_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect();
        return distinct.len() as f64;
    }
    sale.pallets
        .as_ref()
        .map_or(0.0, |pallets| pallets.len() as f64)
}

/// Creation instant of a sale, when its `createdAt` parses.
pub fn sale_instant(sale: &Sale) -> Option<NaiveDateTime> {
    sale.created_at
        .as_deref()
        .and_then(crate::core::dates::parse_instant)
}

/// Keep the sales created inside the range, bounds inclusive. Sales with a
/// missing or unparsable `createdAt` are silently skipped.
pub fn filter_sales_by_period(sales: &[Sale], range: &PeriodRange) -> Vec<Sale> {
    sales
        .iter()
        .filter(|sale| match sale_instant(sale) {
            Some(instant) => range.contains(instant),
            None => {
                debug!("skipping sale without parseable createdAt (saleId={:?})", sale.sale_id);
                false
            }
        })
        .cloned()
        .collect()
}

fn sales_share(count: usize, grand_total: usize) -> f64 {
    if grand_total > 0 {
        count as f64 / grand_total as f64 * 100.0
    } else {
        0.0
    }
}

fn by_sales_desc(a_sales: usize, b_sales: usize, a_key: &str, b_key: &str) -> Ordering {
    b_sales.cmp(&a_sales).then_with(|| a_key.cmp(b_key))
}

#[derive(Default)]
struct SalesAcc {
    sales: usize,
    boxes: f64,
    pallets: f64,
}

impl SalesAcc {
    fn absorb(&mut self, sale: &Sale) {
        self.sales += 1;
        self.boxes += total_boxes_from_sale(sale);
        self.pallets += total_pallets_from_sale(sale);
    }
}

/// Aggregate sales by customer; the share is of the sale count, and rows
/// are sorted by sale count, descending.
pub fn aggregate_by_customer(sales: &[Sale]) -> Vec<CustomerRow> {
    let mut acc: BTreeMap<String, (String, SalesAcc)> = BTreeMap::new();
    for sale in sales {
        let entry = acc
            .entry(sale.customer_key().to_string())
            .or_insert_with(|| (sale.customer_display_name().to_string(), SalesAcc::default()));
        entry.1.absorb(sale);
    }

    let grand_total: usize = acc.values().map(|(_, a)| a.sales).sum();
    let mut rows: Vec<CustomerRow> = acc
        .into_iter()
        .map(|(customer_id, (customer_name, a))| CustomerRow {
            customer_id,
            customer_name,
            total_sales: a.sales,
            total_boxes: a.boxes,
            total_pallets: a.pallets,
            percentage: sales_share(a.sales, grand_total),
        })
        .collect();
    rows.sort_by(|a, b| by_sales_desc(a.total_sales, b.total_sales, &a.customer_id, &b.customer_id));
    rows
}

/// Aggregate sales by commercial type, sorted by sale count descending.
pub fn aggregate_by_type(sales: &[Sale]) -> Vec<SaleTypeRow> {
    let mut acc: BTreeMap<SaleType, SalesAcc> = BTreeMap::new();
    for sale in sales {
        acc.entry(sale.sale_type).or_default().absorb(sale);
    }

    let grand_total: usize = acc.values().map(|a| a.sales).sum();
    let mut rows: Vec<SaleTypeRow> = acc
        .into_iter()
        .map(|(sale_type, a)| SaleTypeRow {
            sale_type,
            total_sales: a.sales,
            total_boxes: a.boxes,
            total_pallets: a.pallets,
            percentage: sales_share(a.sales, grand_total),
        })
        .collect();
    rows.sort_by(|a, b| {
        by_sales_desc(a.total_sales, b.total_sales, a.sale_type.as_str(), b.sale_type.as_str())
    });
    rows
}

/// Aggregate sales by lifecycle state, sorted by sale count descending.
pub fn aggregate_by_state(sales: &[Sale]) -> Vec<SaleStateRow> {
    let mut acc: BTreeMap<SaleState, SalesAcc> = BTreeMap::new();
    for sale in sales {
        acc.entry(sale.state).or_default().absorb(sale);
    }

    let grand_total: usize = acc.values().map(|a| a.sales).sum();
    let mut rows: Vec<SaleStateRow> = acc
        .into_iter()
        .map(|(state, a)| SaleStateRow {
            state,
            total_sales: a.sales,
            total_boxes: a.boxes,
            total_pallets: a.pallets,
            percentage: sales_share(a.sales, grand_total),
        })
        .collect();
    rows.sort_by(|a, b| {
        by_sales_desc(a.total_sales, b.total_sales, a.state.as_str(), b.state.as_str())
    });
    rows
}

/// Bucket sales volume by day, Monday-aligned week, or month. Rows come
/// back in ascending bucket-date order. Sales without a parseable
/// `createdAt` are skipped.
pub fn aggregate_by_temporal_period(
    sales: &[Sale],
    granularity: TemporalGranularity,
) -> Vec<SalesTemporalRow> {
    let mut acc: BTreeMap<chrono::NaiveDate, SalesAcc> = BTreeMap::new();
    for sale in sales {
        let Some(instant) = sale_instant(sale) else {
            continue;
        };
        acc.entry(granularity.bucket_start(instant.date()))
            .or_default()
            .absorb(sale);
    }

    acc.into_iter()
        .map(|(start, a)| SalesTemporalRow {
            label: granularity.bucket_label(start),
            total_sales: a.sales,
            total_boxes: a.boxes,
            total_pallets: a.pallets,
        })
        .collect()
}

/// Period-wide sales totals: counts, zero-guarded averages, the top
/// customers, and the full type and state breakdowns.
pub fn calculate_sales_summary(sales: &[Sale]) -> SalesSummary {
    let total_sales = sales.len();
    let total_boxes: f64 = sales.iter().map(total_boxes_from_sale).sum();
    let total_pallets: f64 = sales.iter().map(total_pallets_from_sale).sum();

    let mut top_customers = aggregate_by_customer(sales);
    top_customers.truncate(TOP_ROWS);

    SalesSummary {
        total_sales,
        total_boxes,
        total_pallets,
        average_boxes_per_sale: if total_sales > 0 {
            total_boxes / total_sales as f64
        } else {
            0.0
        },
        average_pallets_per_sale: if total_sales > 0 {
            total_pallets / total_sales as f64
        } else {
            0.0
        },
        top_customers,
        by_type: aggregate_by_type(sales),
        by_state: aggregate_by_state(sales),
    }
}
