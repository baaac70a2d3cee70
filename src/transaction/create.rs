//! Transaction creation page and endpoint.

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
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{
        create_transaction,
        form::{FormSelects, TransactionFormData, transaction_form_fields},
    },
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the transaction creation page, dated today in the configured
/// timezone.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionEndpointState>,
) -> Result<Response, Error> {
    let today = local_date_today(&state.local_timezone)
        .inspect_err(|error| tracing::error!("Could not determine the local date: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let selects = FormSelects::load(&connection)
        .inspect_err(|error| tracing::error!("Could not load transaction form options: {error}"))?;

    let form = TransactionFormData::new_for(today);

    Ok(new_transaction_view(&form, &selects).into_response())
}

/// Handle transaction creation form submission.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionEndpointState>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let selects = match FormSelects::load(&connection) {
        Ok(selects) => selects,
        Err(error) => {
            tracing::error!("Could not load transaction form options: {error}");
            return error.into_alert_response();
        }
    };

    let builder = match form.builder() {
        Ok(builder) => builder,
        Err(error) => {
            return new_transaction_form_view(&form, &selects, &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_transaction(builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NegativeAmount(_)
            | Error::ConflictingFundingSources
            | Error::InvalidInstallments { .. }
            | Error::CategoryKindMismatch(_)
            | Error::InvalidReference),
        ) => new_transaction_form_view(&form, &selects, &format!("Error: {error}"))
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

fn new_transaction_view(form: &TransactionFormData, selects: &FormSelects) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form_markup = new_transaction_form_view(form, selects, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form_markup) }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

fn new_transaction_form_view(
    form: &TransactionFormData,
    selects: &FormSelects,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_TRANSACTION)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(form, selects))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Transaction" }
        }
    }
}
