//! Transaction data aggregation for the dashboard.
//!
//! Provides pure functions that compute the summary, the expense breakdown by
//! category and the monthly expense series from a snapshot of transactions.

use std::{collections::BTreeMap, ops::RangeInclusive};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{
    LocalTimezone,
    transaction::{Category, Transaction, TransactionType},
};

/// The total and number of transactions for a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category the transactions belong to.
    pub category: Category,
    /// The sum of the transaction amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// The number of transactions.
    pub count: i64,
}

/// The total of transaction amounts for a single calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// The month formatted as "YYYY-MM".
    pub month: String,
    /// The sum of the transaction amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// A snapshot of the user's finances for dashboard display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// All income ever recorded minus all expenses ever recorded.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_balance: Decimal,
    /// The income recorded in the current calendar month.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
    /// The expenses recorded in the current calendar month.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_expenses: Decimal,
    /// The percentage of this month's income that was not spent, to one
    /// decimal place. Zero when there is no income this month.
    #[serde(with = "rust_decimal::serde::float")]
    pub savings_rate: Decimal,
}

/// Sums the amounts of the transactions of type `kind`.
pub fn sum_by_type(transactions: &[Transaction], kind: TransactionType) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
        .map(|transaction| transaction.amount)
        .sum()
}

/// Computes the dashboard summary.
///
/// `all` should hold every transaction ever recorded and `current_month` the
/// transactions within the current calendar month (see [month_window]).
pub fn summarize(all: &[Transaction], current_month: &[Transaction]) -> Summary {
    let total_balance =
        sum_by_type(all, TransactionType::Income) - sum_by_type(all, TransactionType::Expense);
    let monthly_income = sum_by_type(current_month, TransactionType::Income);
    let monthly_expenses = sum_by_type(current_month, TransactionType::Expense);

    Summary {
        total_balance,
        monthly_income,
        monthly_expenses,
        savings_rate: savings_rate(monthly_income, monthly_expenses),
    }
}

/// The percentage of `income` left over after `expenses`, rounded to one
/// decimal place with halves rounded away from zero.
///
/// Returns zero if `income` is not positive.
pub fn savings_rate(income: Decimal, expenses: Decimal) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let rate = (income - expenses) / income * Decimal::ONE_HUNDRED;

    rate.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Groups the transactions of type `kind` by category, summing their amounts
/// and counting them.
///
/// Categories without any matching transactions are omitted. The result is
/// ordered by category name.
pub fn aggregate_by_category(
    transactions: &[Transaction],
    kind: TransactionType,
) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&'static str, CategoryTotal> = BTreeMap::new();

    for transaction in transactions.iter().filter(|t| t.kind == kind) {
        let entry = totals
            .entry(transaction.category.as_str())
            .or_insert_with(|| CategoryTotal {
                category: transaction.category,
                total: Decimal::ZERO,
                count: 0,
            });
        entry.total += transaction.amount;
        entry.count += 1;
    }

    totals.into_values().collect()
}

/// Groups expenses by category. See [aggregate_by_category].
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    aggregate_by_category(transactions, TransactionType::Expense)
}

/// Groups the transactions of type `kind` by the calendar month of their date
/// in `timezone`, summing their amounts.
///
/// Months without any matching transactions are omitted. The result is sorted
/// by month in ascending order.
pub fn aggregate_by_month(
    transactions: &[Transaction],
    kind: TransactionType,
    timezone: &LocalTimezone,
) -> Vec<MonthlyTotal> {
    group_by_month(
        transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| (t.date, t.amount)),
        timezone,
    )
}

/// Groups expenses by calendar month. See [aggregate_by_month].
pub fn monthly_expense_series(
    transactions: &[Transaction],
    timezone: &LocalTimezone,
) -> Vec<MonthlyTotal> {
    aggregate_by_month(transactions, TransactionType::Expense, timezone)
}

/// Sums `(date, amount)` pairs per calendar month in `timezone`, oldest month first.
pub fn group_by_month(
    entries: impl IntoIterator<Item = (OffsetDateTime, Decimal)>,
    timezone: &LocalTimezone,
) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for (date, amount) in entries {
        *totals
            .entry(month_key(date, timezone))
            .or_insert(Decimal::ZERO) += amount;
    }

    totals
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect()
}

/// Formats the calendar month of `date` in `timezone` as "YYYY-MM".
///
/// The offset is the one in effect at `date`, not the current one.
pub fn month_key(date: OffsetDateTime, timezone: &LocalTimezone) -> String {
    let local = date.to_offset(timezone.offset_at(date));

    format!("{:04}-{:02}", local.year(), u8::from(local.month()))
}

/// The calendar month in `timezone` containing `now`, from midnight on the
/// first day up to and including the last millisecond of the last day.
///
/// Each end uses the offset in effect at that time, so a month that spans a
/// daylight saving change is still covered exactly.
pub fn month_window(
    now: OffsetDateTime,
    timezone: &LocalTimezone,
) -> RangeInclusive<OffsetDateTime> {
    let today = now.to_offset(timezone.offset_at(now)).date();
    let first_day = first_of_month(today);
    let next_month = first_of_month(first_day + Duration::days(31));

    let start = timezone.midnight(first_day);
    let end = timezone.midnight(next_month) - Duration::milliseconds(1);

    start..=end
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}
