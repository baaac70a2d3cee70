//! Goal creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints,
    goal::{GoalName, create_goal, domain::GoalFormData},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

/// The state needed for creating a goal.
#[derive(Debug, Clone)]
pub struct CreateGoalEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the goal creation page.
pub async fn get_new_goal_page() -> Response {
    new_goal_view().into_response()
}

/// Handle goal creation form submission.
pub async fn create_goal_endpoint(
    State(state): State<CreateGoalEndpointState>,
    Form(new_goal): Form<GoalFormData>,
) -> Response {
    let name = match GoalName::new(&new_goal.name) {
        Ok(name) => name,
        Err(error) => {
            return new_goal_form_view(&format!("Error: {error}")).into_response();
        }
    };

    if new_goal.target < 0.0 {
        let error = Error::NegativeAmount(new_goal.target);
        return new_goal_form_view(&format!("Error: {error}")).into_response();
    }

    if new_goal.saved < 0.0 {
        let error = Error::NegativeAmount(new_goal.saved);
        return new_goal_form_view(&format!("Error: {error}")).into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let image = new_goal.image.trim();
    let image = (!image.is_empty()).then_some(image);

    match create_goal(
        name,
        new_goal.target,
        new_goal.saved,
        new_goal.deadline,
        new_goal.category.trim(),
        image,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");

            error.into_alert_response()
        }
    }
}

fn new_goal_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_GOAL_VIEW).into_html();
    let form = new_goal_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Goal", &[dollar_input_styles()], &content)
}

fn new_goal_form_view(error_message: &str) -> Markup {
    let create_goal_endpoint = endpoints::POST_GOAL;

    html! {
        form
            hx-post=(create_goal_endpoint)
            hx-target-error="#alert-container"
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
                        placeholder="0.00"
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
                        value="0.00"
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
                    placeholder="/static/images/goal.jpg"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Goal" }
        }
    }
}

#[cfg(test)]
mod new_goal_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        goal::get_new_goal_page,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_goal_page().await;

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_GOAL, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "target", "number");
        assert_form_input(&form, "saved", "number");
        assert_form_input(&form, "deadline", "date");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_goal_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        endpoints,
        goal::{
            create::CreateGoalEndpointState, create_goal_endpoint, create_goal_table,
            domain::GoalFormData, get_goal,
        },
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
    };

    fn get_goal_state() -> CreateGoalEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_goal_table(&connection).expect("Could not create goal table");

        CreateGoalEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_create_goal() {
        let state = get_goal_state();
        let form = GoalFormData {
            name: "Japan Trip".to_string(),
            target: 8_000.0,
            saved: 1_200.0,
            deadline: date!(2026 - 12 - 31),
            category: "travel".to_string(),
            image: "".to_string(),
        };

        let response = create_goal_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::GOALS_VIEW);

        let goal =
            get_goal(1, &state.db_connection.lock().unwrap()).expect("Could not get created goal");
        assert_eq!(goal.name.as_ref(), "Japan Trip");
        assert_eq!(goal.target, 8_000.0);
        assert_eq!(goal.deadline, date!(2026 - 12 - 31));
        assert_eq!(goal.image, None);
    }

    #[tokio::test]
    async fn create_goal_fails_on_empty_name() {
        let state = get_goal_state();
        let form = GoalFormData {
            name: "".to_string(),
            target: 8_000.0,
            saved: 0.0,
            deadline: date!(2026 - 12 - 31),
            category: "".to_string(),
            image: "".to_string(),
        };

        let response = create_goal_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Goal name cannot be empty");
    }

    #[tokio::test]
    async fn create_goal_fails_on_negative_target() {
        let state = get_goal_state();
        let form = GoalFormData {
            name: "Japan Trip".to_string(),
            target: -100.0,
            saved: 0.0,
            deadline: date!(2026 - 12 - 31),
            category: "".to_string(),
            image: "".to_string(),
        };

        let response = create_goal_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: amounts must be zero or greater, got -100");
    }
}
