//! Defines the endpoint for creating a new transaction.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserId,
    transaction::{TransactionDraft, TransactionState, core::create_transaction},
};

/// A route handler for creating a new transaction owned by the authenticated user.
///
/// Responds with `201 Created` and the stored transaction, or `400 Bad Request`
/// if the body is not a draft or the draft fails validation.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    draft: Result<Json<TransactionDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match draft {
        Ok(draft) => draft,
        Err(rejection) => {
            tracing::debug!("Rejected malformed transaction from user {user_id}: {rejection}");
            return Error::InvalidRequest(rejection.body_text()).into_response();
        }
    };

    let new_transaction = match draft.validate() {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::debug!("Rejected transaction draft from user {user_id}: {error}");
            return Error::Validation(error).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(_) => return Error::DatabaseLockError.into_response(),
    };

    match create_transaction(&user_id, new_transaction, &connection) {
        Ok(transaction) => {
            tracing::info!("User {user_id} created transaction {}", transaction.id);
            (StatusCode::CREATED, Json(transaction)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, body::to_bytes, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use serde_json::Value;
    use time::macros::date;

    use crate::{
        UserId,
        db::initialize,
        transaction::{
            Category, Transaction, TransactionState, TransactionType, count_transactions,
            create_transaction_endpoint, get_transactions_by_owner,
            core::test_utils::draft,
        },
    };

    fn get_test_state() -> TransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        TransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state();
        let user_id = UserId::new("alice");

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id.clone()),
            Ok(Json(draft(
                "Coffee",
                50.0,
                date!(2024 - 01 - 01),
                "Food",
                TransactionType::Expense,
            ))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let created: Transaction = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.title, "Coffee");
        assert_eq!(created.owner, user_id);
        assert_eq!(created.category, Category::Food);

        let connection = state.db_connection.lock().unwrap();
        let stored = get_transactions_by_owner(&user_id, &connection).unwrap();
        assert_eq!(stored, vec![created]);
    }

    #[tokio::test]
    async fn cross_type_category_is_rejected_and_not_stored() {
        let state = get_test_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(UserId::new("alice")),
            Ok(Json(draft(
                "Paycheck",
                1000.0,
                date!(2024 - 01 - 01),
                "Food",
                TransactionType::Income,
            ))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["error"],
            "the category Food cannot be used for income transactions"
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }
}
