//! Validates and applies changes to individual transactions.

use crate::{
    Error, LocalTimezone,
    database_id::TransactionId,
    transaction::{
        Transaction, TransactionInput, TransactionStore,
        validation::{validate_new_transaction, validate_patch},
    },
};

/// Creates, updates, deletes and retrieves transactions on top of a [TransactionStore].
#[derive(Debug, Clone)]
pub struct TransactionService<S> {
    store: S,
    timezone: LocalTimezone,
}

impl<S> TransactionService<S>
where
    S: TransactionStore,
{
    /// Create a service that persists transactions in `store`.
    ///
    /// Calendar dates without a time are interpreted as midnight in `timezone`.
    pub fn new(store: S, timezone: LocalTimezone) -> Self {
        Self { store, timezone }
    }

    /// Validate `input` and store it as a new transaction.
    ///
    /// # Errors
    /// Returns [Error::Validation] listing every missing or invalid field, or
    /// the store's error if the transaction could not be saved.
    pub fn create(&self, input: &TransactionInput) -> Result<Transaction, Error> {
        let new_transaction = validate_new_transaction(input, &self.timezone)?;
        let transaction = self.store.insert(new_transaction)?;

        tracing::info!(
            "Created {} transaction {} for {}",
            transaction.kind,
            transaction.id,
            transaction.amount
        );

        Ok(transaction)
    }

    /// Replace the fields supplied in `input` on the transaction `id`.
    ///
    /// An `input` without any fields returns the transaction unchanged.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a supplied field is invalid, or
    /// [Error::NotFound] if `id` does not refer to a stored transaction.
    pub fn update(&self, id: TransactionId, input: &TransactionInput) -> Result<Transaction, Error> {
        let patch = validate_patch(input, &self.timezone)?;

        if patch.is_empty() {
            return self.store.find_by_id(id);
        }

        let transaction = self.store.update_by_id(id, patch)?;
        tracing::info!("Updated transaction {id}");

        Ok(transaction)
    }

    /// Delete the transaction `id`, returning whether it existed.
    pub fn delete(&self, id: TransactionId) -> Result<bool, Error> {
        let deleted = self.store.delete_by_id(id)?;

        if deleted {
            tracing::info!("Deleted transaction {id}");
        } else {
            tracing::debug!("Tried to delete transaction {id} but it does not exist");
        }

        Ok(deleted)
    }

    /// Retrieve the transaction `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a stored transaction.
    pub fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.store.find_by_id(id)
    }

    /// Retrieve every transaction, most recent date first.
    pub fn list(&self) -> Result<Vec<Transaction>, Error> {
        self.store.list_all()
    }
}
