//! Transaction editing page and endpoint.

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
    AppState, Error, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{
        TransactionId,
        form::{FormSelects, TransactionFormData, transaction_form_fields},
        get_transaction, update_transaction,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The state needed for updating a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transaction editing page.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let selects = FormSelects::load(&connection)
        .inspect_err(|error| tracing::error!("Could not load transaction form options: {error}"))?;

    let edit_endpoint =
        endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);

    match get_transaction(transaction_id, &connection) {
        Ok(transaction) => {
            let form = TransactionFormData::from_transaction(&transaction);

            Ok(
                edit_transaction_view(&edit_endpoint, &update_endpoint, &form, &selects, "")
                    .into_response(),
            )
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Transaction not found",
                _ => {
                    tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
                    "Failed to load transaction"
                }
            };

            let today = local_date_today(&state.local_timezone)?;
            let form = TransactionFormData::new_for(today);

            Ok(edit_transaction_view(
                &edit_endpoint,
                &update_endpoint,
                &form,
                &selects,
                error_message,
            )
            .into_response())
        }
    }
}

/// Handle transaction update form submission.
///
/// Updating a transaction that no longer exists is treated as a no-op and
/// still redirects to the transactions list.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<UpdateTransactionEndpointState>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);

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
            return edit_transaction_form_view(
                &update_endpoint,
                &form,
                &selects,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match update_transaction(transaction_id, builder, &connection) {
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
        ) => edit_transaction_form_view(
            &update_endpoint,
            &form,
            &selects,
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_transaction_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    form: &TransactionFormData,
    selects: &FormSelects,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form_markup = edit_transaction_form_view(update_endpoint, form, selects, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form_markup) }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}

fn edit_transaction_form_view(
    update_endpoint: &str,
    form: &TransactionFormData,
    selects: &FormSelects,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Transaction" }
        }
    }
}
