//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    AnalyticsService, Error, LocalTimezone, SQLiteTransactionStore, TransactionService,
    TransactionStore, db::initialize,
};

/// The state of the REST server.
///
/// The services share the same store, so changes made through the
/// [TransactionService] are immediately visible to the [AnalyticsService].
#[derive(Debug, Clone)]
pub struct AppState<S>
where
    S: TransactionStore,
{
    /// The service for creating, updating and retrieving transactions.
    pub transaction_service: TransactionService<S>,

    /// The service for computing the analytics over all transactions.
    pub analytics_service: AnalyticsService<S>,

    /// The timezone used for calendar dates and months.
    pub local_timezone: LocalTimezone,
}

impl<S> AppState<S>
where
    S: TransactionStore,
{
    /// Create a new [AppState] where both services use `store`.
    pub fn new(store: S, local_timezone: LocalTimezone) -> Self {
        Self {
            transaction_service: TransactionService::new(store.clone(), local_timezone),
            analytics_service: AnalyticsService::new(store, local_timezone),
            local_timezone,
        }
    }
}

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState = AppState<SQLiteTransactionStore>;

/// Create a new [SQLAppState] with a SQLite database connection.
///
/// This function will initialize the database by adding the tables for the domain models.
/// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns an error if the timezone is not valid or if the database cannot be initialized.
pub fn create_app_state(
    db_connection: Connection,
    local_timezone: &str,
) -> Result<SQLAppState, Error> {
    let local_timezone = LocalTimezone::new(local_timezone)?;
    initialize(&db_connection)?;

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(db_connection)));

    Ok(AppState::new(store, local_timezone))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, create_app_state};

    #[test]
    fn creates_state_with_valid_timezone() {
        let connection = Connection::open_in_memory().unwrap();

        let state = create_app_state(connection, "Pacific/Auckland").unwrap();

        assert_eq!(state.local_timezone.name(), "Pacific/Auckland");
    }

    #[test]
    fn rejects_invalid_timezone() {
        let connection = Connection::open_in_memory().unwrap();

        let result = create_app_state(connection, "Not/A_Timezone");

        assert_eq!(
            result.map(|_| ()),
            Err(Error::InvalidTimezone("Not/A_Timezone".to_owned()))
        );
    }
}
