use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserId,
    transaction::{TransactionState, core::get_transactions_by_owner},
};

/// A route handler that lists every transaction owned by the authenticated user.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(_) => return Error::DatabaseLockError.into_response(),
    };

    match get_transactions_by_owner(&user_id, &connection) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => {
            tracing::error!("Could not list transactions for user {user_id}: {error}");
            error.into_response()
        }
    }
}
