//! Goal edit page and update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::macros::date;

use crate::{
    AppState, Error,
    endpoints,
    goal::{
        GoalId, GoalName,
        db::{get_goal, update_goal},
        domain::GoalFormData,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        date_attr, dollar_input_styles,
    },
    navigation::NavBar,
};

/// The state needed for rendering the goal edit page.
#[derive(Debug, Clone)]
pub struct EditGoalPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGoalPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn placeholder_form() -> GoalFormData {
    GoalFormData {
        name: String::new(),
        target: 0.0,
        saved: 0.0,
        deadline: date!(2099 - 01 - 01),
        category: String::new(),
        image: String::new(),
    }
}

/// Render the page for editing an existing goal.
pub async fn get_edit_goal_page(
    State(state): State<EditGoalPageState>,
    Path(goal_id): Path<GoalId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let (form, error_message) = match get_goal(goal_id, &connection) {
        Ok(goal) => (
            GoalFormData {
                name: goal.name.to_string(),
                target: goal.target,
                saved: goal.saved,
                deadline: goal.deadline,
                category: goal.category,
                image: goal.image.unwrap_or_default(),
            },
            String::new(),
        ),
        Err(Error::NotFound) => (placeholder_form(), "Goal not found".to_string()),
        Err(error) => {
            tracing::error!("An unexpected error occurred while fetching a goal: {error}");

            (placeholder_form(), "Failed to load goal".to_string())
        }
    };

    Ok(edit_goal_view(goal_id, &form, &error_message).into_response())
}

/// The state needed for updating a goal.
#[derive(Debug, Clone)]
pub struct UpdateGoalEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateGoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle the form submission for updating a goal.
pub async fn update_goal_endpoint(
    State(state): State<UpdateGoalEndpointState>,
    Path(goal_id): Path<GoalId>,
    Form(form_data): Form<GoalFormData>,
) -> Response {
    let name = match GoalName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_goal_form_view(goal_id, &form_data, &format!("Error: {error}"))
                .into_response();
        }
    };

    if form_data.target < 0.0 {
        let error = Error::NegativeAmount(form_data.target);
        return edit_goal_form_view(goal_id, &form_data, &format!("Error: {error}"))
            .into_response();
    }

    if form_data.saved < 0.0 {
        let error = Error::NegativeAmount(form_data.saved);
        return edit_goal_form_view(goal_id, &form_data, &format!("Error: {error}"))
            .into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let image = form_data.image.trim();
    let image = (!image.is_empty()).then_some(image);

    match update_goal(
        goal_id,
        name,
        form_data.target,
        form_data.saved,
        form_data.deadline,
        form_data.category.trim(),
        image,
        &connection,
    ) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a goal: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_goal_view(goal_id: GoalId, form: &GoalFormData, error: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();
    let form = edit_goal_form_view(goal_id, form, error);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Goal", &[dollar_input_styles()], &content)
}

fn edit_goal_form_view(goal_id: GoalId, form: &GoalFormData, error_message: &str) -> Markup {
    let update_goal_endpoint = endpoints::format_endpoint(endpoints::PUT_GOAL, goal_id);

    html! {
        form
            hx-put=(update_goal_endpoint)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Goal Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(form.name)
                    placeholder="Goal Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="target"
                    class=(FORM_LABEL_STYLE)
                {
                    "Target Amount"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="target"
                        type="number"
                        name="target"
                        value=(form.target)
                        step="0.01"
                        min="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label
                    for="saved"
                    class=(FORM_LABEL_STYLE)
                {
                    "Saved So Far"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="saved"
                        type="number"
                        name="saved"
                        value=(form.saved)
                        step="0.01"
                        min="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label
                    for="deadline"
                    class=(FORM_LABEL_STYLE)
                {
                    "Deadline"
                }

                input
                    id="deadline"
                    type="date"
                    name="deadline"
                    value=(date_attr(form.deadline))
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="category"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category (optional)"
                }

                input
                    id="category"
                    type="text"
                    name="category"
                    value=(form.category)
                    placeholder="travel"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="image"
                    class=(FORM_LABEL_STYLE)
                {
                    "Image URL (optional)"
                }

                input
                    id="image"
                    type="text"
                    name="image"
                    value=(form.image)
                    placeholder="/static/images/goal.jpg"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
        }
    }
}

#[cfg(test)]
mod edit_goal_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        goal::{
            GoalName, create_goal, create_goal_table, edit::EditGoalPageState, get_edit_goal_page,
        },
        test_utils::{
            assert_form_input_with_value, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    fn get_edit_page_state() -> EditGoalPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_goal_table(&connection).expect("Could not create goal table");

        EditGoalPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn render_page_with_existing_goal() {
        let state = get_edit_page_state();
        create_goal(
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            1_200.0,
            date!(2026 - 12 - 31),
            "travel",
            None,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test goal");

        let response = get_edit_goal_page(State(state), Path(1))
            .await
            .expect("Could not get edit goal page");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "Japan Trip");
        assert_form_input_with_value(&form, "target", "number", "8000");
        assert_form_input_with_value(&form, "deadline", "date", "2026-12-31");
    }

    #[tokio::test]
    async fn render_page_with_invalid_id_shows_error() {
        let state = get_edit_page_state();

        let response = get_edit_goal_page(State(state), Path(999))
            .await
            .expect("Could not get edit goal page");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Goal not found"),
            "page should report the missing goal, got: {text}"
        );
    }
}
