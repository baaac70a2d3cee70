//! Account creation page and endpoint.

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
    account::{AccountName, create_account, domain::AccountFormData},
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

/// The state needed for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the account creation page.
pub async fn get_new_account_page() -> Response {
    new_account_view().into_response()
}

/// Handle account creation form submission.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountEndpointState>,
    Form(new_account): Form<AccountFormData>,
) -> Response {
    let name = match AccountName::new(&new_account.name) {
        Ok(name) => name,
        Err(error) => {
            return new_account_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let color = new_account.color.trim();
    let color = (!color.is_empty()).then_some(color);

    match create_account(
        name,
        new_account.institution.trim(),
        new_account.balance,
        color,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DuplicateAccountName) => (
            StatusCode::BAD_REQUEST,
            Alert::Error {
                message: "Duplicate Account".to_owned(),
                details: format!(
                    "The account \"{}\" already exists. \
                    Choose a different name, or edit or delete the existing account.",
                    new_account.name
                ),
            }
            .into_html(),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an account: {error}");

            error.into_alert_response()
        }
    }
}

fn new_account_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();
    let form = new_account_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Account", &[dollar_input_styles()], &content)
}

fn new_account_form_view(error_message: &str) -> Markup {
    let create_account_endpoint = endpoints::POST_ACCOUNT;

    html! {
        form
            hx-post=(create_account_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Account Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Account Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="institution"
                    class=(FORM_LABEL_STYLE)
                {
                    "Institution"
                }

                input
                    id="institution"
                    type="text"
                    name="institution"
                    placeholder="Bank or institution"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="balance"
                    class=(FORM_LABEL_STYLE)
                {
                    "Current Balance"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="balance"
                        type="number"
                        name="balance"
                        value="0.00"
                        step="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label
                    for="color"
                    class=(FORM_LABEL_STYLE)
                {
                    "Colour (optional)"
                }

                input
                    id="color"
                    type="text"
                    name="color"
                    placeholder="#2563eb"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Account" }
        }
    }
}
