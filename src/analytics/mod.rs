//! Aggregated views over the recorded transactions: the dashboard summary,
//! the expense breakdown by category and the monthly expense series.

pub mod aggregation;
mod endpoints;
mod service;

pub use aggregation::{CategoryTotal, MonthlyTotal, Summary};
pub use endpoints::{
    get_category_breakdown_endpoint, get_monthly_expenses_endpoint, get_summary_endpoint,
};
pub use service::AnalyticsService;
