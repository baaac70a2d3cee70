//! Recurring template deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    recurring::{TemplateId, delete_template},
};

/// The state needed for deleting a recurring template.
#[derive(Debug, Clone)]
pub struct DeleteRecurringEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRecurringEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle requests to delete the recurring template with `template_id`.
///
/// Transactions already generated from the template are kept.
pub async fn delete_recurring_endpoint(
    State(state): State<DeleteRecurringEndpointState>,
    Path(template_id): Path<TemplateId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_template(template_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Recurring transaction deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting a recurring template: {error}"
            );

            error.into_alert_response()
        }
    }
}
