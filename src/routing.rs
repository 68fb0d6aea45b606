//! Application router configuration.

use axum::{Router, routing::get};

use crate::{
    AppState,
    analytics::{
        get_category_breakdown_endpoint, get_monthly_expenses_endpoint, get_summary_endpoint,
    },
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        TransactionStore, create_transaction_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, get_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: TransactionStore,
{
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint::<S>).post(create_transaction_endpoint::<S>),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint::<S>)
                .put(edit_transaction_endpoint::<S>)
                .delete(delete_transaction_endpoint::<S>),
        )
        .route(
            endpoints::CATEGORY_ANALYTICS,
            get(get_category_breakdown_endpoint::<S>),
        )
        .route(
            endpoints::MONTHLY_EXPENSES,
            get(get_monthly_expenses_endpoint::<S>),
        )
        .route(endpoints::SUMMARY, get(get_summary_endpoint::<S>))
        .fallback(get_404_not_found)
        .with_state(state)
}
