//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId, ValidationError,
    transaction::{Category, TransactionType},
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are created from a validated [NewTransaction] and are never
/// edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the database.
    pub id: TransactionId,
    /// The user that created the transaction.
    pub owner: UserId,
    /// A text label for what the transaction was for.
    pub title: String,
    /// The magnitude of the transaction. Always non-negative, the sign comes
    /// from `transaction_type`.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// The category the transaction belongs to.
    pub category: Category,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

/// The client supplied fields for a new transaction.
///
/// The category is kept as free text until [TransactionDraft::validate]
/// checks it against the enumeration for `transaction_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// A text label for what the transaction was for.
    pub title: String,
    /// The magnitude of the transaction.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// The name of the category.
    pub category: String,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl TransactionDraft {
    /// Check the draft and convert it into a [NewTransaction].
    ///
    /// # Errors
    /// This function will return a:
    /// - [ValidationError::EmptyTitle] if the title is empty or only whitespace,
    /// - [ValidationError::InvalidAmount] if the amount is negative, NaN or infinite,
    /// - [ValidationError::UnknownCategory] if the category is not a known category,
    /// - or [ValidationError::CategoryMismatch] if the category does not belong to the transaction type.
    pub fn validate(self) -> Result<NewTransaction, ValidationError> {
        let title = self.title.trim();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidAmount(self.amount.to_string()));
        }

        let category: Category = self.category.parse()?;

        if !self.transaction_type.allows(category) {
            return Err(ValidationError::CategoryMismatch {
                category,
                transaction_type: self.transaction_type,
            });
        }

        Ok(NewTransaction {
            title: title.to_owned(),
            amount: self.amount,
            date: self.date,
            category,
            transaction_type: self.transaction_type,
        })
    }
}

/// A transaction that has passed validation but has not been stored yet.
///
/// The only way to get one outside this module is [TransactionDraft::validate],
/// so `category` always belongs to `transaction_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    title: String,
    amount: f64,
    date: Date,
    category: Category,
    transaction_type: TransactionType,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction owned by `owner`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    owner: &UserId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (owner, title, amount, date, category, type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, owner, title, amount, date, category, type",
        )?
        .query_row(
            (
                owner.as_str(),
                transaction.title,
                transaction.amount,
                transaction.date,
                transaction.category.as_str(),
                transaction.transaction_type.as_str(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get all of the transactions owned by `owner`, newest first.
///
/// Transactions on the same date are ordered by most recently created first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_owner(
    owner: &UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, owner, title, amount, date, category, type FROM \"transaction\"
             WHERE owner = :owner
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":owner", owner.as_str())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

type RowsAffected = usize;

/// Delete the transaction `id` if it is owned by `owner`.
///
/// Returns the number of deleted rows, zero if the transaction does not exist
/// or belongs to another user.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    owner: &UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND owner = :owner",
            rusqlite::named_params! { ":id": id, ":owner": owner.as_str() },
        )
        .map_err(|err| err.into())
}

/// Get the total number of transactions in the database across all users.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense'))
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_date ON \"transaction\"(owner, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let owner: String = row.get(1)?;
    let title = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let category: String = row.get(5)?;
    let transaction_type: String = row.get(6)?;

    let category = category
        .parse::<Category>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error)))?;
    let transaction_type = transaction_type
        .parse::<TransactionType>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id,
        owner: UserId::new(&owner),
        title,
        amount,
        date,
        category,
        transaction_type,
    })
}

// ============================================================================
// TESTS
// ============================================================================
