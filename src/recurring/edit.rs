//! Recurring template editing page and endpoint.

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
    recurring::{
        TemplateId,
        form::{TemplateFormData, TemplateSelects, template_form_fields},
        get_template, update_template,
    },
    timezone::local_date_today,
};

/// The state needed for the edit recurring template page.
#[derive(Debug, Clone)]
pub struct EditRecurringPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for EditRecurringPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The state needed for updating a recurring template.
#[derive(Debug, Clone)]
pub struct UpdateRecurringEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateRecurringEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the recurring template editing page.
pub async fn get_edit_recurring_page(
    Path(template_id): Path<TemplateId>,
    State(state): State<EditRecurringPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let selects = TemplateSelects::load(&connection)
        .inspect_err(|error| tracing::error!("Could not load recurring form options: {error}"))?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_RECURRING_VIEW, template_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_RECURRING, template_id);

    match get_template(template_id, &connection) {
        Ok(template) => {
            let form = TemplateFormData::from_template(&template);

            Ok(
                edit_recurring_view(&edit_endpoint, &update_endpoint, &form, &selects, "")
                    .into_response(),
            )
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Recurring transaction not found",
                _ => {
                    tracing::error!("Failed to retrieve recurring template {template_id}: {error}");
                    "Failed to load recurring transaction"
                }
            };

            let today = local_date_today(&state.local_timezone)?;
            let form = TemplateFormData::new_for(today);

            Ok(edit_recurring_view(
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

/// Handle recurring template update form submission.
///
/// Updating a template that no longer exists is treated as a no-op and still
/// redirects to the recurring transactions list.
pub async fn update_recurring_endpoint(
    Path(template_id): Path<TemplateId>,
    State(state): State<UpdateRecurringEndpointState>,
    Form(form): Form<TemplateFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_RECURRING, template_id);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let selects = match TemplateSelects::load(&connection) {
        Ok(selects) => selects,
        Err(error) => {
            tracing::error!("Could not load recurring form options: {error}");
            return error.into_alert_response();
        }
    };

    let builder = match form.builder() {
        Ok(builder) => builder,
        Err(error) => {
            return edit_recurring_form_view(
                &update_endpoint,
                &form,
                &selects,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match update_template(template_id, builder, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::RECURRING_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NegativeAmount(_)
            | Error::MissingScheduleAnchor(_)
            | Error::InvalidScheduleBounds
            | Error::CategoryKindMismatch(_)
            | Error::InvalidReference),
        ) => edit_recurring_form_view(&update_endpoint, &form, &selects, &format!("Error: {error}"))
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating recurring template {template_id}: \
                {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_recurring_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    form: &TemplateFormData,
    selects: &TemplateSelects,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form_markup = edit_recurring_form_view(update_endpoint, form, selects, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form_markup) }
    };

    base("Edit Recurring Transaction", &[dollar_input_styles()], &content)
}

fn edit_recurring_form_view(
    update_endpoint: &str,
    form: &TemplateFormData,
    selects: &TemplateSelects,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (template_form_fields(form, selects))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Recurring Transaction" }
        }
    }
}
