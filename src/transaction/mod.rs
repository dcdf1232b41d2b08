//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions on the server:
//! - The `Transaction` model, the closed category enumerations and draft validation
//! - Database functions for storing, listing and deleting transactions
//! - The JSON route handlers for `/api/transactions`

mod category;
mod core;
mod create_transaction_endpoint;
mod delete_transaction_endpoint;
mod list_transactions_endpoint;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use category::{Category, TransactionType};
pub use core::{
    NewTransaction, Transaction, TransactionDraft, TransactionId, create_transaction,
    create_transaction_table, delete_transaction, get_transactions_by_owner,
};
pub use create_transaction_endpoint::create_transaction_endpoint;
pub use delete_transaction_endpoint::delete_transaction_endpoint;
pub use list_transactions_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub use core::count_transactions;

#[cfg(test)]
pub(crate) use core::test_utils;

/// The state needed to list, create or delete transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
