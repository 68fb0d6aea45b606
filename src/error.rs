//! Defines the app level error type and its conversion to JSON responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::transaction::{FieldError, ValidationErrors};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields of a transaction failed validation.
    ///
    /// The client should correct the listed fields and try again.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The transaction ID in the request path is not an integer.
    #[error("\"{0}\" is not a valid transaction ID")]
    InvalidTransactionId(String),

    /// The request body could not be read as a JSON object.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// A string did not name one of the transaction categories.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// A string was neither "income" nor "expense".
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the ID is
    /// correct and that the transaction has not been deleted.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Error::Validation(value)
    }
}

impl From<JsonRejection> for Error {
    fn from(value: JsonRejection) -> Self {
        Error::InvalidRequestBody(value.body_text())
    }
}

/// The JSON body sent to the client for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

fn json_error(status_code: StatusCode, message: &str) -> Response {
    (
        status_code,
        Json(ErrorBody {
            message,
            errors: None,
        }),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    message: "Validation failed",
                    errors: Some(errors.as_slice()),
                }),
            )
                .into_response(),
            Error::InvalidTransactionId(_) => {
                json_error(StatusCode::BAD_REQUEST, "Invalid transaction ID")
            }
            Error::InvalidRequestBody(reason) => json_error(
                StatusCode::BAD_REQUEST,
                &format!("Invalid request body: {reason}"),
            ),
            Error::NotFound => json_error(StatusCode::NOT_FOUND, "Transaction not found"),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred",
                )
            }
        }
    }
}
