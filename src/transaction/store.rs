//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use time::OffsetDateTime;

use crate::{
    Error, LocalTimezone,
    analytics::{CategoryTotal, MonthlyTotal},
    database_id::TransactionId,
    transaction::core::{NewTransaction, Transaction, TransactionPatch, TransactionType},
};

/// Handles the persistence, retrieval and aggregation of transactions.
///
/// Implementations only need to guarantee that each call is atomic with
/// respect to a single transaction.
pub trait TransactionStore: Clone + Send + Sync + 'static {
    /// Create a new transaction, assigning its ID and setting its creation
    /// time to now.
    fn insert(&self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Replace the fields set in `patch` on the transaction `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a stored transaction.
    fn update_by_id(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, Error>;

    /// Delete the transaction `id`, returning whether a transaction was removed.
    fn delete_by_id(&self, id: TransactionId) -> Result<bool, Error>;

    /// Retrieve a transaction by its ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a stored transaction.
    fn find_by_id(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve every transaction, most recent date first.
    fn list_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Retrieve the transactions dated within `date_range` (inclusive), most
    /// recent date first.
    fn list_by_date_range(
        &self,
        date_range: RangeInclusive<OffsetDateTime>,
    ) -> Result<Vec<Transaction>, Error>;

    /// Sum and count the transactions of type `kind` per category.
    ///
    /// Categories without transactions are omitted. Ordered by category name.
    fn aggregate_by_category(&self, kind: TransactionType) -> Result<Vec<CategoryTotal>, Error>;

    /// Sum the transactions of type `kind` per calendar month in `timezone`.
    ///
    /// Each transaction is placed in a month using the offset in effect at its date.
    ///
    /// Months without transactions are omitted. Sorted by month ascending.
    fn aggregate_by_month(
        &self,
        kind: TransactionType,
        timezone: &LocalTimezone,
    ) -> Result<Vec<MonthlyTotal>, Error>;
}
