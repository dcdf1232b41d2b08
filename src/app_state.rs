//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, TokenVerifier, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Verifies the bearer tokens issued by the identity provider.
    pub token_verifier: TokenVerifier,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, token_verifier: TokenVerifier) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            token_verifier,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
