//! Member creation page and endpoint.

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
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    member::{MemberName, create_member, domain::MemberFormData},
    navigation::NavBar,
};

/// The state needed for creating a member.
#[derive(Debug, Clone)]
pub struct CreateMemberEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateMemberEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the member creation page.
pub async fn get_new_member_page() -> Response {
    new_member_view().into_response()
}

/// Handle member creation form submission.
pub async fn create_member_endpoint(
    State(state): State<CreateMemberEndpointState>,
    Form(new_member): Form<MemberFormData>,
) -> Response {
    let name = match MemberName::new(&new_member.name) {
        Ok(name) => name,
        Err(error) => {
            return new_member_form_view(&format!("Error: {error}")).into_response();
        }
    };

    if let Some(monthly_income) = new_member.monthly_income {
        if monthly_income < 0.0 {
            let error = Error::NegativeAmount(monthly_income);
            return new_member_form_view(&format!("Error: {error}")).into_response();
        }
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let avatar = new_member.avatar.trim();
    let avatar = (!avatar.is_empty()).then_some(avatar);

    match create_member(
        name,
        new_member.role.trim(),
        avatar,
        new_member.monthly_income,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::MEMBERS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a member: {error}");

            error.into_alert_response()
        }
    }
}

fn new_member_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_MEMBER_VIEW).into_html();
    let form = new_member_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Member", &[dollar_input_styles()], &content)
}

fn new_member_form_view(error_message: &str) -> Markup {
    let create_member_endpoint = endpoints::POST_MEMBER;

    html! {
        form
            hx-post=(create_member_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="role"
                    class=(FORM_LABEL_STYLE)
                {
                    "Role"
                }

                input
                    id="role"
                    type="text"
                    name="role"
                    placeholder="Parent, Child, ..."
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="avatar"
                    class=(FORM_LABEL_STYLE)
                {
                    "Avatar URL (optional)"
                }

                input
                    id="avatar"
                    type="text"
                    name="avatar"
                    placeholder="/static/avatars/alex.png"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="monthly_income"
                    class=(FORM_LABEL_STYLE)
                {
                    "Estimated Monthly Income (optional)"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="monthly_income"
                        type="number"
                        name="monthly_income"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Member" }
        }
    }
}
