use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserId,
    transaction::{TransactionId, TransactionState, core::delete_transaction},
};

/// A route handler for deleting one of the authenticated user's transactions.
///
/// Responds with `204 No Content` on success and `404 Not Found` if the
/// transaction does not exist or belongs to someone else. An ID that is not
/// an integer gets `400 Bad Request`.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Response {
    let Path(transaction_id) = match transaction_id {
        Ok(transaction_id) => transaction_id,
        Err(rejection) => {
            tracing::debug!("Rejected delete from user {user_id}: {rejection}");
            return Error::InvalidRequest(rejection.body_text()).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(_) => return Error::DatabaseLockError.into_response(),
    };

    match delete_transaction(&user_id, transaction_id, &connection) {
        Ok(0) => {
            tracing::debug!("User {user_id} tried to delete missing transaction {transaction_id}");
            Error::DeleteMissingTransaction.into_response()
        }
        Ok(_) => {
            tracing::info!("User {user_id} deleted transaction {transaction_id}");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}
