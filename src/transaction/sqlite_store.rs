//! Implements a SQLite backed transaction store.

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{
    Connection, Row, params, params_from_iter,
    types::{Type, Value},
};
use time::OffsetDateTime;

use crate::{
    Error, LocalTimezone,
    analytics::{CategoryTotal, MonthlyTotal, aggregation::group_by_month},
    database_id::TransactionId,
    transaction::{
        FieldError, TransactionStore, ValidationErrors,
        core::{
            NewTransaction, Transaction, TransactionPatch, TransactionType, amount_to_cents,
            cents_to_amount, from_unix_millis, to_unix_millis,
        },
    },
};

const TRANSACTION_COLUMNS: &str =
    "id, amount_cents, description, category, \"type\", date, created_at";

/// Stores transactions in a SQLite database.
///
/// The `transaction` table must exist, see [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }

    fn query_transactions(
        &self,
        query: &str,
        parameters: &[Value],
    ) -> Result<Vec<Transaction>, Error> {
        let connection = self.connection()?;
        let mut statement = connection.prepare(query)?;
        let transactions = statement
            .query_map(params_from_iter(parameters.iter()), map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if the amount cannot be stored as a whole number of cents,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn insert(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let amount_cents = cents_or_validation_error(&transaction)?;
        let created_at = to_unix_millis(OffsetDateTime::now_utc());

        let transaction = self
            .connection()?
            .prepare(&format!(
                "INSERT INTO \"transaction\" (amount_cents, description, category, \"type\", date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                params![
                    amount_cents,
                    transaction.description,
                    transaction.category,
                    transaction.kind,
                    to_unix_millis(transaction.date),
                    created_at,
                ],
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    /// Update the fields set in `patch`, leaving `id` and `created_at` untouched.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn update_by_id(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, Error> {
        if patch.is_empty() {
            return self.find_by_id(id);
        }

        let mut columns = Vec::new();
        let mut parameters = Vec::new();

        if let Some(amount) = patch.amount {
            let amount_cents = amount_to_cents(amount).ok_or_else(invalid_amount)?;
            columns.push("amount_cents");
            parameters.push(Value::Integer(amount_cents));
        }

        if let Some(description) = patch.description {
            columns.push("description");
            parameters.push(Value::Text(description));
        }

        if let Some(category) = patch.category {
            columns.push("category");
            parameters.push(Value::Text(category.as_str().to_owned()));
        }

        if let Some(kind) = patch.kind {
            columns.push("\"type\"");
            parameters.push(Value::Text(kind.as_str().to_owned()));
        }

        if let Some(date) = patch.date {
            columns.push("date");
            parameters.push(Value::Integer(to_unix_millis(date)));
        }

        let set_clause = columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        parameters.push(Value::Integer(id));

        let query = format!(
            "UPDATE \"transaction\" SET {set_clause} WHERE id = ?{} RETURNING {TRANSACTION_COLUMNS}",
            parameters.len()
        );

        let transaction = self
            .connection()?
            .prepare(&query)?
            .query_row(params_from_iter(parameters.iter()), map_transaction_row)?;

        Ok(transaction)
    }

    /// Delete a transaction by its `id`.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is some SQL error.
    fn delete_by_id(&self, id: TransactionId) -> Result<bool, Error> {
        let rows_affected = self
            .connection()?
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", params![id])?;

        Ok(rows_affected > 0)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn find_by_id(&self, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = self
            .connection()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], map_transaction_row)?;

        Ok(transaction)
    }

    fn list_all(&self) -> Result<Vec<Transaction>, Error> {
        self.query_transactions(
            &format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY date DESC, id DESC"
            ),
            &[],
        )
    }

    fn list_by_date_range(
        &self,
        date_range: RangeInclusive<OffsetDateTime>,
    ) -> Result<Vec<Transaction>, Error> {
        self.query_transactions(
            &format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE date BETWEEN ?1 AND ?2
                 ORDER BY date DESC, id DESC"
            ),
            &[
                Value::Integer(to_unix_millis(*date_range.start())),
                Value::Integer(to_unix_millis(*date_range.end())),
            ],
        )
    }

    fn aggregate_by_category(&self, kind: TransactionType) -> Result<Vec<CategoryTotal>, Error> {
        let connection = self.connection()?;
        let mut statement = connection.prepare(
            "SELECT category, SUM(amount_cents), COUNT(id) FROM \"transaction\"
             WHERE \"type\" = ?1
             GROUP BY category
             ORDER BY category",
        )?;

        let totals = statement
            .query_map(params![kind], |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: cents_to_amount(row.get(1)?),
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    fn aggregate_by_month(
        &self,
        kind: TransactionType,
        timezone: &LocalTimezone,
    ) -> Result<Vec<MonthlyTotal>, Error> {
        let connection = self.connection()?;
        // The month depends on the offset at each date, which SQLite cannot
        // resolve, so the rows are grouped here.
        let mut statement = connection
            .prepare("SELECT date, amount_cents FROM \"transaction\" WHERE \"type\" = ?1")?;

        let entries = statement
            .query_map(params![kind], |row| {
                Ok((get_timestamp(row, 0)?, cents_to_amount(row.get(1)?)))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(group_by_month(entries, timezone))
    }
}

fn invalid_amount() -> Error {
    Error::Validation(ValidationErrors::from(vec![FieldError::new(
        "amount",
        "Invalid amount format",
    )]))
}

fn cents_or_validation_error(transaction: &NewTransaction) -> Result<i64, Error> {
    amount_to_cents(transaction.amount).ok_or_else(invalid_amount)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount_cents INTEGER NOT NULL CHECK (amount_cents BETWEEN 0 AND 9999999999),
                description TEXT NOT NULL,
                category TEXT NOT NULL CHECK (category IN (
                    'food', 'transportation', 'shopping', 'entertainment',
                    'utilities', 'healthcare', 'income', 'other'
                )),
                \"type\" TEXT NOT NULL CHECK (\"type\" IN ('income', 'expense')),
                date INTEGER NOT NULL,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Used by the listing and the monthly summary.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of `TRANSACTION_COLUMNS`.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount_cents = row.get(1)?;
    let description = row.get(2)?;
    let category = row.get(3)?;
    let kind = row.get(4)?;
    let date = get_timestamp(row, 5)?;
    let created_at = get_timestamp(row, 6)?;

    Ok(Transaction {
        id,
        amount: cents_to_amount(amount_cents),
        description,
        category,
        kind,
        date,
        created_at,
    })
}

fn get_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let millis = row.get(index)?;

    from_unix_millis(millis).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        Error, LocalTimezone,
        analytics::aggregation::{aggregate_by_category, aggregate_by_month},
        initialize_db,
        transaction::{
            Category, NewTransaction, SQLiteTransactionStore, TransactionPatch, TransactionStore,
            TransactionType,
        },
    };

    fn get_test_store() -> SQLiteTransactionStore {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)))
    }

    fn new_transaction(
        amount: rust_decimal::Decimal,
        kind: TransactionType,
        category: Category,
        date: OffsetDateTime,
    ) -> NewTransaction {
        NewTransaction {
            amount,
            description: "test".to_owned(),
            category,
            kind,
            date,
        }
    }

    fn insert_samples(store: &SQLiteTransactionStore) {
        let samples = [
            (dec!(5000.00), TransactionType::Income, Category::Income, datetime!(2024-01-01 09:00 UTC)),
            (dec!(120.50), TransactionType::Expense, Category::Food, datetime!(2024-01-03 18:00 UTC)),
            (dec!(45.25), TransactionType::Expense, Category::Transportation, datetime!(2024-01-31 20:00 UTC)),
            (dec!(80.00), TransactionType::Expense, Category::Food, datetime!(2024-02-10 12:00 UTC)),
            (dec!(0.10), TransactionType::Expense, Category::Other, datetime!(1969-12-31 23:59:59.500 UTC)),
            (dec!(0.20), TransactionType::Expense, Category::Other, datetime!(2024-04-30 23:59 UTC)),
        ];

        for (amount, kind, category, date) in samples {
            store
                .insert(new_transaction(amount, kind, category, date))
                .expect("could not create test transaction");
        }
    }

    #[test]
    fn insert_assigns_id_and_created_at() {
        let store = get_test_store();
        let before = OffsetDateTime::now_utc() - Duration::seconds(1);

        let transaction = store
            .insert(new_transaction(
                dec!(12.30),
                TransactionType::Expense,
                Category::Food,
                datetime!(2024-03-10 12:00 UTC),
            ))
            .unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.amount, dec!(12.30));
        assert_eq!(transaction.amount.to_string(), "12.30");
        assert_eq!(transaction.category, Category::Food);
        assert_eq!(transaction.kind, TransactionType::Expense);
        assert_eq!(transaction.date, datetime!(2024-03-10 12:00 UTC));
        assert!(transaction.created_at >= before);
    }

    #[test]
    fn find_returns_inserted_transaction() {
        let store = get_test_store();
        let inserted = store
            .insert(new_transaction(
                dec!(1.23),
                TransactionType::Income,
                Category::Income,
                datetime!(2024-03-10 12:00:00.123 UTC),
            ))
            .unwrap();

        let found = store.find_by_id(inserted.id).unwrap();

        assert_eq!(found, inserted);
    }

    #[test]
    fn find_fails_on_missing_id() {
        let store = get_test_store();

        assert_eq!(store.find_by_id(42), Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_only_patched_fields() {
        let store = get_test_store();
        let original = store
            .insert(new_transaction(
                dec!(1.23),
                TransactionType::Expense,
                Category::Food,
                datetime!(2024-03-10 12:00 UTC),
            ))
            .unwrap();

        let updated = store
            .update_by_id(
                original.id,
                TransactionPatch {
                    amount: Some(dec!(3.21)),
                    category: Some(Category::Shopping),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.amount, dec!(3.21));
        assert_eq!(updated.category, Category::Shopping);
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.kind, original.kind);
        assert_eq!(updated.date, original.date);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(store.find_by_id(original.id).unwrap(), updated);
    }

    #[test]
    fn update_fails_on_missing_id() {
        let store = get_test_store();

        let result = store.update_by_id(
            42,
            TransactionPatch {
                description: Some("foo".to_owned()),
                ..Default::default()
            },
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn empty_update_fails_on_missing_id() {
        let store = get_test_store();

        assert_eq!(
            store.update_by_id(42, TransactionPatch::default()),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_reports_whether_a_row_was_removed() {
        let store = get_test_store();
        let transaction = store
            .insert(new_transaction(
                dec!(1.23),
                TransactionType::Expense,
                Category::Food,
                datetime!(2024-03-10 12:00 UTC),
            ))
            .unwrap();

        assert_eq!(store.delete_by_id(transaction.id), Ok(true));
        assert_eq!(store.delete_by_id(transaction.id), Ok(false));
        assert_eq!(store.find_by_id(transaction.id), Err(Error::NotFound));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = get_test_store();
        let sample = new_transaction(
            dec!(1.00),
            TransactionType::Expense,
            Category::Food,
            datetime!(2024-03-10 12:00 UTC),
        );
        let first = store.insert(sample.clone()).unwrap();
        store.delete_by_id(first.id).unwrap();

        let second = store.insert(sample).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn list_all_orders_by_date_descending() {
        let store = get_test_store();
        insert_samples(&store);

        let transactions = store.list_all().unwrap();

        assert_eq!(transactions.len(), 6);
        assert!(
            transactions
                .windows(2)
                .all(|pair| pair[0].date >= pair[1].date)
        );
    }

    #[test]
    fn list_by_date_range_is_inclusive() {
        let store = get_test_store();
        insert_samples(&store);

        let transactions = store
            .list_by_date_range(datetime!(2024-01-03 18:00 UTC)..=datetime!(2024-02-10 12:00 UTC))
            .unwrap();

        let amounts: Vec<_> = transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec!(80.00), dec!(45.25), dec!(120.50)]);
    }

    #[test]
    fn aggregate_by_category_matches_in_memory_aggregation() {
        let store = get_test_store();
        insert_samples(&store);
        let transactions = store.list_all().unwrap();

        for kind in [TransactionType::Income, TransactionType::Expense] {
            assert_eq!(
                store.aggregate_by_category(kind).unwrap(),
                aggregate_by_category(&transactions, kind)
            );
        }
    }

    #[test]
    fn aggregate_by_month_matches_in_memory_aggregation() {
        let store = get_test_store();
        insert_samples(&store);
        let transactions = store.list_all().unwrap();
        let timezones = ["Etc/UTC", "Pacific/Auckland", "America/New_York", "Europe/London"];

        for name in timezones {
            let timezone = LocalTimezone::new(name).unwrap();
            assert_eq!(
                store
                    .aggregate_by_month(TransactionType::Expense, &timezone)
                    .unwrap(),
                aggregate_by_month(&transactions, TransactionType::Expense, &timezone),
                "aggregates differ for timezone {name}"
            );
        }
    }

    #[test]
    fn aggregate_by_month_uses_offset_at_each_date() {
        let store = get_test_store();
        let london = LocalTimezone::new("Europe/London").unwrap();
        for date in [
            datetime!(2024-06-30 23:00 UTC),
            datetime!(2024-09-30 23:00 UTC),
            datetime!(2024-12-01 00:00 UTC),
        ] {
            store
                .insert(new_transaction(
                    dec!(1.00),
                    TransactionType::Expense,
                    Category::Food,
                    date,
                ))
                .unwrap();
        }

        let months: Vec<_> = store
            .aggregate_by_month(TransactionType::Expense, &london)
            .unwrap()
            .into_iter()
            .map(|entry| entry.month)
            .collect();

        assert_eq!(months, vec!["2024-07", "2024-10", "2024-12"]);
    }

    #[test]
    fn aggregates_do_not_overflow_with_largest_amounts() {
        let store = get_test_store();
        for _ in 0..3 {
            store
                .insert(new_transaction(
                    dec!(99999999.99),
                    TransactionType::Expense,
                    Category::Food,
                    datetime!(2024-03-10 12:00 UTC),
                ))
                .unwrap();
        }
        let transactions = store.list_all().unwrap();
        let utc = LocalTimezone::new("Etc/UTC").unwrap();

        let by_category = store
            .aggregate_by_category(TransactionType::Expense)
            .unwrap();
        let by_month = store
            .aggregate_by_month(TransactionType::Expense, &utc)
            .unwrap();

        assert_eq!(by_category[0].total, dec!(299999999.97));
        assert_eq!(
            by_category,
            aggregate_by_category(&transactions, TransactionType::Expense)
        );
        assert_eq!(
            by_month,
            aggregate_by_month(&transactions, TransactionType::Expense, &utc)
        );
    }

    #[test]
    fn insert_rejects_amount_above_limit() {
        let store = get_test_store();

        let result = store.insert(new_transaction(
            dec!(100000000.00),
            TransactionType::Expense,
            Category::Food,
            datetime!(2024-03-10 12:00 UTC),
        ));

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.list_all(), Ok(vec![]));
    }

    #[test]
    fn aggregates_are_empty_without_transactions() {
        let store = get_test_store();

        assert_eq!(
            store.aggregate_by_category(TransactionType::Expense),
            Ok(vec![])
        );
        assert_eq!(
            store.aggregate_by_month(
                TransactionType::Expense,
                &LocalTimezone::new("Etc/UTC").unwrap()
            ),
            Ok(vec![])
        );
    }

    #[test]
    fn rejects_invalid_category_in_database() {
        let store = get_test_store();

        let result = store.connection().unwrap().execute(
            "INSERT INTO \"transaction\" (amount_cents, description, category, \"type\", date, created_at)
             VALUES (100, 'test', 'groceries', 'expense', 0, 0)",
            (),
        );

        assert!(result.is_err());
    }
}
