pub mod comparator;
pub mod types;

pub use comparator::{
    calculate_period_change, compare_aggregated_data, compare_production_periods,
    compare_sales_periods,
};
pub use types::{ChangeIndicator, ComparisonRow, ProductionComparison, SalesComparison};
