use time::OffsetDateTime;

use crate::{
    Error, LocalTimezone,
    analytics::aggregation::{CategoryTotal, MonthlyTotal, Summary, month_window, summarize},
    transaction::{TransactionStore, TransactionType},
};

/// Computes the analytics for the transactions in a [TransactionStore].
///
/// Nothing is cached, every call reads the current state of the store.
#[derive(Debug, Clone)]
pub struct AnalyticsService<S> {
    store: S,
    timezone: LocalTimezone,
}

impl<S> AnalyticsService<S>
where
    S: TransactionStore,
{
    /// Create a service that reads transactions from `store` and computes
    /// calendar months in `timezone`.
    pub fn new(store: S, timezone: LocalTimezone) -> Self {
        Self { store, timezone }
    }

    /// The summary as of `now`.
    ///
    /// The balance covers all transactions while the income, expenses and
    /// savings rate only cover the calendar month containing `now`.
    pub fn summary(&self, now: OffsetDateTime) -> Result<Summary, Error> {
        let all = self.store.list_all()?;
        let current_month = self
            .store
            .list_by_date_range(month_window(now, &self.timezone))?;

        Ok(summarize(&all, &current_month))
    }

    /// The expense totals per category, ordered by category name.
    pub fn category_breakdown(&self) -> Result<Vec<CategoryTotal>, Error> {
        self.store.aggregate_by_category(TransactionType::Expense)
    }

    /// The expense totals per calendar month, oldest month first.
    pub fn monthly_expense_series(&self) -> Result<Vec<MonthlyTotal>, Error> {
        self.store
            .aggregate_by_month(TransactionType::Expense, &self.timezone)
    }
}
