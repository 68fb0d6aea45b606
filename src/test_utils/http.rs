use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use serde_json::Value;

use crate::{AppState, LocalTimezone, SQLiteTransactionStore, build_router, initialize_db};

/// Serve the full router over a fresh in-memory database using `timezone`.
pub(crate) fn get_test_server(timezone: &str) -> TestServer {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize_db(&connection).expect("could not initialize test DB");

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));
    let timezone = LocalTimezone::new(timezone).expect("invalid test timezone");
    let app = build_router(AppState::new(store, timezone));

    TestServer::try_new(app).expect("Could not create test server.")
}

#[track_caller]
pub(crate) fn assert_error_message(response: &TestResponse, status: StatusCode, message: &str) {
    response.assert_status(status);
    let body: Value = response.json();
    assert_eq!(body["message"], message, "unexpected error body {body}");
}
