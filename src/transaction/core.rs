//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are only ever constructed by a
/// [TransactionStore](crate::TransactionStore), which assigns the `id` and
/// `created_at` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned, always non-negative with two
    /// decimal places. Serialized as a string, e.g. "12.50".
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// What the money was spent on or where it came from.
    pub category: Category,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// When the transaction was recorded. Never modified after creation.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated fields needed to create a [Transaction].
///
/// Create one from client input with
/// [validate_new_transaction](crate::transaction::validate_new_transaction).
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A non-negative amount with at most two decimal places.
    pub amount: Decimal,
    /// A non-empty description of at most 255 characters.
    pub description: String,
    /// The category of the transaction.
    pub category: Category,
    /// Whether money was earned or spent.
    pub kind: TransactionType,
    /// When the transaction happened, truncated to milliseconds.
    pub date: OffsetDateTime,
}

/// A partial update of a [Transaction]. Fields set to `None` are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    /// The new amount.
    pub amount: Option<Decimal>,
    /// The new description.
    pub description: Option<String>,
    /// The new category.
    pub category: Option<Category>,
    /// The new transaction type.
    pub kind: Option<TransactionType>,
    /// The new date.
    pub date: Option<OffsetDateTime>,
}

impl TransactionPatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.kind.is_none()
            && self.date.is_none()
    }
}

/// The fixed set of categories a transaction can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Groceries, restaurants, takeaways.
    Food,
    /// Fuel, public transport, parking.
    Transportation,
    /// Clothes, electronics, household goods.
    Shopping,
    /// Movies, games, events.
    Entertainment,
    /// Power, water, internet.
    Utilities,
    /// Doctor visits, prescriptions.
    Healthcare,
    /// Salary, gifts, refunds.
    Income,
    /// Anything else.
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transportation,
        Category::Shopping,
        Category::Entertainment,
        Category::Utilities,
        Category::Healthcare,
        Category::Income,
        Category::Other,
    ];

    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transportation => "transportation",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Utilities => "utilities",
            Category::Healthcare => "healthcare",
            Category::Income => "income",
            Category::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a transaction earned or spent money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DATABASE CONVERSIONS
// ============================================================================

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The largest amount a single transaction can hold, 99,999,999.99, in cents.
///
/// Keeps sums over any realistic number of transactions within an `i64`.
pub(crate) const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

/// Convert an amount into a whole number of cents.
///
/// Returns `None` if the amount has more than two decimal places or is not
/// between zero and [MAX_AMOUNT_CENTS].
pub(crate) fn amount_to_cents(amount: Decimal) -> Option<i64> {
    let mut scaled = amount;
    scaled.rescale(2);

    if scaled != amount {
        return None;
    }

    i64::try_from(scaled.mantissa())
        .ok()
        .filter(|cents| (0..=MAX_AMOUNT_CENTS).contains(cents))
}

/// Convert a whole number of cents into an amount with two decimal places.
pub(crate) fn cents_to_amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert a timestamp into milliseconds since the Unix epoch.
pub(crate) fn to_unix_millis(timestamp: OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos().div_euclid(1_000_000)) as i64
}

/// Convert milliseconds since the Unix epoch into a UTC timestamp.
pub(crate) fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
}
