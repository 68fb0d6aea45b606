//! Transaction management for the finance tracker.
//!
//! This module contains everything related to individual transactions:
//! - The `Transaction` model and the closed `Category` and `TransactionType` sets
//! - Validation of client input
//! - The `TransactionStore` trait and its SQLite implementation
//! - The `TransactionService` and its JSON route handlers

mod core;
mod endpoints;
mod service;
mod sqlite_store;
mod store;
mod validation;

pub use core::{Category, NewTransaction, Transaction, TransactionPatch, TransactionType};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
    get_transaction_endpoint, get_transactions_endpoint,
};
pub use service::TransactionService;
pub use sqlite_store::{SQLiteTransactionStore, create_transaction_table};
pub use store::TransactionStore;
pub use validation::{FieldError, TransactionInput, ValidationErrors};
