//! Transaction deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    transaction::{TransactionId, delete_transaction},
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle requests to delete the transaction with `transaction_id`.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionEndpointState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Transaction deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting a transaction: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        test_utils::{assert_valid_html, parse_html_fragment},
        transaction::{
            TransactionBuilder, TransactionKind, create_transaction, create_transaction_table,
            delete::DeleteTransactionEndpointState, delete_transaction_endpoint, get_transaction,
        },
    };

    fn get_delete_state() -> DeleteTransactionEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_transaction_table(&connection).expect("Could not create transaction table");

        DeleteTransactionEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_delete_transaction() {
        let state = get_delete_state();
        let transaction = create_transaction(
            TransactionBuilder::new(
                42.5,
                date!(2024 - 03 - 05),
                "Weekly shop",
                TransactionKind::Expense,
            ),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test transaction");

        let response = delete_transaction_endpoint(State(state.clone()), Path(transaction.id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(get_transaction(transaction.id, &state.db_connection.lock().unwrap()).is_err());
    }

    #[tokio::test]
    async fn delete_transaction_endpoint_with_missing_id_still_succeeds() {
        let state = get_delete_state();

        let response = delete_transaction_endpoint(State(state), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
    }
}
