use std::{
    collections::BTreeMap,
    ops::RangeInclusive,
    sync::{Arc, Mutex},
};

use time::OffsetDateTime;

use crate::{
    Error, LocalTimezone,
    analytics::{
        CategoryTotal, MonthlyTotal,
        aggregation::{aggregate_by_category, aggregate_by_month},
    },
    database_id::TransactionId,
    transaction::{
        NewTransaction, Transaction, TransactionPatch, TransactionStore, TransactionType,
    },
};

#[derive(Debug, Default)]
struct Inner {
    last_id: TransactionId,
    transactions: BTreeMap<TransactionId, Transaction>,
}

/// A [TransactionStore] that keeps transactions in memory, for testing
/// services without a database.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryTransactionStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTransactionStore {
    fn sorted(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        transactions
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn insert(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.last_id += 1;

        let transaction = Transaction {
            id: inner.last_id,
            amount: transaction.amount,
            description: transaction.description,
            category: transaction.category,
            kind: transaction.kind,
            date: transaction.date,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.transactions.insert(transaction.id, transaction.clone());

        Ok(transaction)
    }

    fn update_by_id(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, Error> {
        let mut inner = self.inner.lock().unwrap();
        let transaction = inner.transactions.get_mut(&id).ok_or(Error::NotFound)?;

        if let Some(amount) = patch.amount {
            transaction.amount = amount;
        }
        if let Some(description) = patch.description {
            transaction.description = description;
        }
        if let Some(category) = patch.category {
            transaction.category = category;
        }
        if let Some(kind) = patch.kind {
            transaction.kind = kind;
        }
        if let Some(date) = patch.date {
            transaction.date = date;
        }

        Ok(transaction.clone())
    }

    fn delete_by_id(&self, id: TransactionId) -> Result<bool, Error> {
        Ok(self.inner.lock().unwrap().transactions.remove(&id).is_some())
    }

    fn find_by_id(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.inner
            .lock()
            .unwrap()
            .transactions
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn list_all(&self) -> Result<Vec<Transaction>, Error> {
        let transactions = self
            .inner
            .lock()
            .unwrap()
            .transactions
            .values()
            .cloned()
            .collect();

        Ok(Self::sorted(transactions))
    }

    fn list_by_date_range(
        &self,
        date_range: RangeInclusive<OffsetDateTime>,
    ) -> Result<Vec<Transaction>, Error> {
        let transactions = self
            .inner
            .lock()
            .unwrap()
            .transactions
            .values()
            .filter(|transaction| date_range.contains(&transaction.date))
            .cloned()
            .collect();

        Ok(Self::sorted(transactions))
    }

    fn aggregate_by_category(&self, kind: TransactionType) -> Result<Vec<CategoryTotal>, Error> {
        Ok(aggregate_by_category(&self.list_all()?, kind))
    }

    fn aggregate_by_month(
        &self,
        kind: TransactionType,
        timezone: &LocalTimezone,
    ) -> Result<Vec<MonthlyTotal>, Error> {
        Ok(aggregate_by_month(&self.list_all()?, kind, timezone))
    }
}
