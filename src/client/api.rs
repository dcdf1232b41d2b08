//! The transaction operations a client can perform for its signed in user.

use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error, Transaction, TransactionDraft, TransactionId, UserId, create_transaction,
    delete_transaction, get_transactions_by_owner,
};

/// Access to the current user's transactions.
///
/// The user is implied by the credentials the implementation was created with.
pub trait TransactionApi {
    /// Get the user's transactions, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Transaction>, Error>> + Send;

    /// Store a new transaction and return it with its assigned ID.
    fn create(
        &self,
        draft: TransactionDraft,
    ) -> impl Future<Output = Result<Transaction, Error>> + Send;

    /// Delete one of the user's transactions.
    ///
    /// Fails with [Error::DeleteMissingTransaction] if the transaction does
    /// not exist or belongs to someone else.
    fn delete(&self, id: TransactionId) -> impl Future<Output = Result<(), Error>> + Send;
}

/// A [TransactionApi] that talks to the database directly, for clients
/// embedded in the same process as the store.
#[derive(Debug, Clone)]
pub struct LocalTransactionApi {
    db_connection: Arc<Mutex<Connection>>,
    owner: UserId,
}

impl LocalTransactionApi {
    /// Act as `owner` on the transactions in `db_connection`.
    pub fn new(db_connection: Arc<Mutex<Connection>>, owner: UserId) -> Self {
        Self {
            db_connection,
            owner,
        }
    }
}

impl TransactionApi for LocalTransactionApi {
    async fn list(&self) -> Result<Vec<Transaction>, Error> {
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions_by_owner(&self.owner, &connection)
    }

    async fn create(&self, draft: TransactionDraft) -> Result<Transaction, Error> {
        let new_transaction = draft.validate()?;
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_transaction(&self.owner, new_transaction, &connection)
    }

    async fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match delete_transaction(&self.owner, id, &connection)? {
            0 => Err(Error::DeleteMissingTransaction),
            _ => Ok(()),
        }
    }
}
