//! The JSON route handlers for creating, reading, updating and deleting transactions.

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{Transaction, TransactionInput, TransactionService, TransactionStore},
};

impl<S> FromRef<AppState<S>> for TransactionService<S>
where
    S: TransactionStore,
{
    fn from_ref(state: &AppState<S>) -> Self {
        state.transaction_service.clone()
    }
}

/// Parse a transaction ID from a URL path segment.
///
/// # Errors
/// Returns [Error::InvalidTransactionId] if `raw_id` is not an integer.
pub fn parse_transaction_id(raw_id: &str) -> Result<TransactionId, Error> {
    raw_id
        .parse()
        .map_err(|_| Error::InvalidTransactionId(raw_id.to_owned()))
}

/// A route handler that returns every transaction, most recent first.
pub async fn get_transactions_endpoint<S>(
    State(service): State<TransactionService<S>>,
) -> Result<Json<Vec<Transaction>>, Error>
where
    S: TransactionStore,
{
    service.list().map(Json)
}

/// A route handler that returns a single transaction.
pub async fn get_transaction_endpoint<S>(
    State(service): State<TransactionService<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Transaction>, Error>
where
    S: TransactionStore,
{
    let id = parse_transaction_id(&raw_id)?;

    service.get(id).map(Json)
}

/// A route handler for creating a new transaction, responds with the created
/// transaction and the status code 201.
pub async fn create_transaction_endpoint<S>(
    State(service): State<TransactionService<S>>,
    body: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Response, Error>
where
    S: TransactionStore,
{
    let Json(input) = body?;
    let transaction = service.create(&input)?;

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// A route handler for updating the supplied fields of a transaction.
pub async fn edit_transaction_endpoint<S>(
    State(service): State<TransactionService<S>>,
    Path(raw_id): Path<String>,
    body: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<Transaction>, Error>
where
    S: TransactionStore,
{
    let id = parse_transaction_id(&raw_id)?;
    let Json(input) = body?;

    service.update(id, &input).map(Json)
}

/// A route handler for deleting a transaction, responds with 204 No Content on success.
pub async fn delete_transaction_endpoint<S>(
    State(service): State<TransactionService<S>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, Error>
where
    S: TransactionStore,
{
    let id = parse_transaction_id(&raw_id)?;

    if service.delete(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound)
    }
}
