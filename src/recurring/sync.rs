//! The endpoint that generates the transactions owed by recurring templates.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    recurring::materialize::{MaterializeOutcome, materialize_recurring_transactions},
    timezone::local_date_today,
};

/// The state needed for syncing recurring transactions.
#[derive(Debug, Clone)]
pub struct SyncRecurringEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for SyncRecurringEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Generate the transactions owed by every active recurring template up to
/// today in the configured timezone.
///
/// Syncing twice in a row creates nothing the second time; each template
/// tracks the last occurrence it generated.
pub async fn sync_recurring_endpoint(State(state): State<SyncRecurringEndpointState>) -> Response {
    let today = match local_date_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => {
            tracing::error!("Could not determine the local date: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match materialize_recurring_transactions(&connection, today) {
        Ok(outcome) => Alert::Success {
            message: "Recurring transactions synced".to_owned(),
            details: outcome_details(outcome),
        }
        .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while syncing recurring transactions: {error}"
            );

            error.into_alert_response()
        }
    }
}

fn outcome_details(outcome: MaterializeOutcome) -> String {
    let mut details = format!(
        "Created {} transactions from {} templates.",
        outcome.transactions_created, outcome.templates_processed
    );

    if outcome.templates_skipped > 0 {
        details.push_str(&format!(
            " {} templates were skipped, check the server logs.",
            outcome.templates_skipped
        ));
    }

    details
}
