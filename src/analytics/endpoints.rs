//! The JSON route handlers for the analytics.

use axum::{
    Json,
    extract::{FromRef, State},
};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    analytics::{AnalyticsService, CategoryTotal, MonthlyTotal, Summary},
    transaction::TransactionStore,
};

impl<S> FromRef<AppState<S>> for AnalyticsService<S>
where
    S: TransactionStore,
{
    fn from_ref(state: &AppState<S>) -> Self {
        state.analytics_service.clone()
    }
}

/// A route handler that returns the expense totals per category.
pub async fn get_category_breakdown_endpoint<S>(
    State(service): State<AnalyticsService<S>>,
) -> Result<Json<Vec<CategoryTotal>>, Error>
where
    S: TransactionStore,
{
    service.category_breakdown().map(Json)
}

/// A route handler that returns the expense totals per calendar month.
pub async fn get_monthly_expenses_endpoint<S>(
    State(service): State<AnalyticsService<S>>,
) -> Result<Json<Vec<MonthlyTotal>>, Error>
where
    S: TransactionStore,
{
    service.monthly_expense_series().map(Json)
}

/// A route handler that returns the balance and this month's figures.
pub async fn get_summary_endpoint<S>(
    State(service): State<AnalyticsService<S>>,
) -> Result<Json<Summary>, Error>
where
    S: TransactionStore,
{
    service.summary(OffsetDateTime::now_utc()).map(Json)
}
