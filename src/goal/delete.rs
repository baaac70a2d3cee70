//! Goal deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    goal::{GoalId, db::delete_goal},
};

/// The state needed for deleting a goal.
#[derive(Debug, Clone)]
pub struct DeleteGoalEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteGoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle requests to delete the goal with `goal_id`.
pub async fn delete_goal_endpoint(
    State(state): State<DeleteGoalEndpointState>,
    Path(goal_id): Path<GoalId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_goal(goal_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Goal deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting a goal: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_goal_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        goal::{
            GoalName, create_goal, create_goal_table, delete::DeleteGoalEndpointState,
            delete_goal_endpoint, get_goal,
        },
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    fn get_delete_state() -> DeleteGoalEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_goal_table(&connection).expect("Could not create goal table");

        DeleteGoalEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_delete_goal() {
        let state = get_delete_state();
        create_goal(
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            0.0,
            date!(2026 - 12 - 31),
            "",
            None,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test goal");

        let response = delete_goal_endpoint(State(state.clone()), Path(1))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(get_goal(1, &state.db_connection.lock().unwrap()).is_err());
    }

    #[tokio::test]
    async fn delete_goal_endpoint_with_missing_id_still_succeeds() {
        let state = get_delete_state();

        let response = delete_goal_endpoint(State(state), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
    }
}
