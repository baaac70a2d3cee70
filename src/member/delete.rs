//! Member deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    member::{MemberId, db::delete_member},
};

/// The state needed for deleting a member.
#[derive(Debug, Clone)]
pub struct DeleteMemberEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteMemberEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle member deletion.
///
/// Deleting a member that no longer exists is treated as a success, so the
/// client sees the same outcome either way. Transactions that referenced the
/// member are kept with their member reference cleared.
pub async fn delete_member_endpoint(
    Path(member_id): Path<MemberId>,
    State(state): State<DeleteMemberEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_member(member_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Member deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting member {member_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
