//! Fintrack is a personal finance tracker.
//!
//! This library provides:
//! - a JSON REST API for storing each user's income and expense
//!   transactions, protected by bearer tokens from an external identity provider,
//! - and the [client] module, the state logic a front end needs: the
//!   transaction form, the list/totals session and the device-local spending goals.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
pub mod client;
mod config;
mod db;
mod endpoints;
mod logging;
mod routing;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::{AuthError, AuthState, Claims, TokenVerifier, auth_guard, issue_hs256_token};
pub use config::ServerConfig;
pub use db::initialize as initialize_db;
pub use endpoints::format_endpoint;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    Category, NewTransaction, Transaction, TransactionDraft, TransactionId, TransactionType,
    create_transaction, delete_transaction, get_transactions_by_owner,
};
pub use user::UserId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The reasons user input may be rejected before it reaches a store.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// The transaction title was empty or only whitespace.
    #[error("title cannot be empty")]
    EmptyTitle,

    /// The transaction amount was missing, not a number, negative or infinite.
    #[error("\"{0}\" is not a valid amount, enter a number zero or greater")]
    InvalidAmount(String),

    /// The transaction date was missing or not a `YYYY-MM-DD` date.
    #[error("\"{0}\" is not a valid date, use the format YYYY-MM-DD")]
    InvalidDate(String),

    /// The category name is not one of the known categories.
    #[error("\"{0}\" is not a known category")]
    UnknownCategory(String),

    /// The transaction type is neither `income` nor `expense`.
    #[error("\"{0}\" is not a transaction type, use \"income\" or \"expense\"")]
    UnknownTransactionType(String),

    /// The category exists but belongs to the other transaction type.
    #[error("the category {category} cannot be used for {transaction_type} transactions")]
    CategoryMismatch {
        /// The category that was chosen.
        category: transaction::Category,
        /// The type of the transaction.
        transaction_type: transaction::TransactionType,
    },

    /// A goal was missing its category or its limit was not a positive number.
    #[error("category and numeric limit required")]
    InvalidGoal,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user supplied data that failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request body or path could not be parsed into the expected shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request could not be authenticated.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist or that belongs to another user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The key for verifying identity tokens could not be loaded.
    #[error("invalid identity provider key: {0}")]
    InvalidIdentityKey(String),

    /// A development token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// A request from the client to the transaction API failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Device-local storage could not be read or written.
    #[error("local storage error: {0}")]
    LocalStorage(String),
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

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Validation(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            Error::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
            Error::Auth(error) => return error.into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested resource could not be found.".to_owned(),
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                "The transaction could not be found. \
                It may have already been deleted."
                    .to_owned(),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
