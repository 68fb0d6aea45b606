#![allow(missing_docs)]

pub(crate) mod http;
pub(crate) mod memory_store;

pub(crate) use http::{assert_error_message, get_test_server};
pub(crate) use memory_store::InMemoryTransactionStore;
