//! Card deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    card::{CardId, db::delete_card},
};

/// The state needed for deleting a card.
#[derive(Debug, Clone)]
pub struct DeleteCardEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCardEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle requests to delete the card with `card_id`.
///
/// Transactions paid with the card are kept, with their card reference
/// cleared.
pub async fn delete_card_endpoint(
    State(state): State<DeleteCardEndpointState>,
    Path(card_id): Path<CardId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_card(card_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Card deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting a card: {error}");

            error.into_alert_response()
        }
    }
}
