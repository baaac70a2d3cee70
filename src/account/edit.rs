//! Account edit page and update endpoint.

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

use crate::{
    AppState, Error,
    account::{
        AccountId, AccountName,
        db::{get_account, update_account},
        domain::AccountFormData,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

/// The state needed for rendering the account edit page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page for editing an existing account.
pub async fn get_edit_account_page(
    State(state): State<EditAccountPageState>,
    Path(account_id): Path<AccountId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let (form, error_message) = match get_account(account_id, &connection) {
        Ok(account) => (
            AccountFormData {
                name: account.name.to_string(),
                institution: account.institution,
                balance: account.balance,
                color: account.color.unwrap_or_default(),
            },
            String::new(),
        ),
        Err(Error::NotFound) => (
            AccountFormData {
                name: String::new(),
                institution: String::new(),
                balance: 0.0,
                color: String::new(),
            },
            "Account not found".to_string(),
        ),
        Err(error) => {
            tracing::error!("An unexpected error occurred while fetching an account: {error}");

            (
                AccountFormData {
                    name: String::new(),
                    institution: String::new(),
                    balance: 0.0,
                    color: String::new(),
                },
                "Failed to load account".to_string(),
            )
        }
    };

    Ok(edit_account_view(account_id, &form, &error_message).into_response())
}

/// The state needed for updating an account.
#[derive(Debug, Clone)]
pub struct UpdateAccountEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateAccountEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle the form submission for updating an account.
pub async fn update_account_endpoint(
    State(state): State<UpdateAccountEndpointState>,
    Path(account_id): Path<AccountId>,
    Form(form_data): Form<AccountFormData>,
) -> Response {
    let name = match AccountName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_account_form_view(account_id, &form_data, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let color = form_data.color.trim();
    let color = (!color.is_empty()).then_some(color);

    match update_account(
        account_id,
        name,
        form_data.institution.trim(),
        form_data.balance,
        color,
        &connection,
    ) {
        Ok(()) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateAccountName) => {
            edit_account_form_view(account_id, &form_data, &format!("Error: {error}"))
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating an account: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_account_view(account_id: AccountId, form: &AccountFormData, error: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();
    let form = edit_account_form_view(account_id, form, error);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Account", &[dollar_input_styles()], &content)
}

fn edit_account_form_view(
    account_id: AccountId,
    form: &AccountFormData,
    error_message: &str,
) -> Markup {
    let update_account_endpoint = endpoints::format_endpoint(endpoints::PUT_ACCOUNT, account_id);

    html! {
        form
            hx-put=(update_account_endpoint)
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
                    value=(form.name)
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
                    value=(form.institution)
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
                        value=(form.balance)
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
                    value=(form.color)
                    placeholder="#2563eb"
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
