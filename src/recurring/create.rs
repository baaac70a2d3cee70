//! Recurring template creation page and endpoint.

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
    recurring::{
        create_template,
        form::{TemplateFormData, TemplateSelects, template_form_fields},
    },
    timezone::local_date_today,
};

/// The state needed for creating a recurring template.
#[derive(Debug, Clone)]
pub struct CreateRecurringEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateRecurringEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the recurring template creation page, starting today in the
/// configured timezone.
pub async fn get_new_recurring_page(
    State(state): State<CreateRecurringEndpointState>,
) -> Result<Response, Error> {
    let today = local_date_today(&state.local_timezone)
        .inspect_err(|error| tracing::error!("Could not determine the local date: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let selects = TemplateSelects::load(&connection)
        .inspect_err(|error| tracing::error!("Could not load recurring form options: {error}"))?;

    let form = TemplateFormData::new_for(today);

    Ok(new_recurring_view(&form, &selects).into_response())
}

/// Handle recurring template creation form submission.
pub async fn create_recurring_endpoint(
    State(state): State<CreateRecurringEndpointState>,
    Form(form): Form<TemplateFormData>,
) -> Response {
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
            return new_recurring_form_view(&form, &selects, &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_template(builder, &connection) {
        Ok(_) => (
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
        ) => new_recurring_form_view(&form, &selects, &format!("Error: {error}")).into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while creating a recurring template: {error}"
            );

            error.into_alert_response()
        }
    }
}

fn new_recurring_view(form: &TemplateFormData, selects: &TemplateSelects) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_RECURRING_VIEW).into_html();
    let form_markup = new_recurring_form_view(form, selects, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form_markup) }
    };

    base("Create Recurring Transaction", &[dollar_input_styles()], &content)
}

fn new_recurring_form_view(
    form: &TemplateFormData,
    selects: &TemplateSelects,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_RECURRING)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Recurring Transaction" }
        }
    }
}

#[cfg(test)]
mod new_recurring_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        endpoints,
        recurring::create::{CreateRecurringEndpointState, get_new_recurring_page},
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    fn get_test_state() -> CreateRecurringEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        CreateRecurringEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Pacific/Auckland".to_string(),
        }
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_new_recurring_page(State(get_test_state()))
            .await
            .unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_RECURRING, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "start_date", "date");
        assert_form_input(&form, "description", "text");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_recurring_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints,
        recurring::{
            Frequency,
            create::{CreateRecurringEndpointState, create_recurring_endpoint},
            form::TemplateFormData,
            get_all_templates,
        },
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
    };

    fn get_test_state() -> CreateRecurringEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        CreateRecurringEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Pacific/Auckland".to_string(),
        }
    }

    fn test_form() -> TemplateFormData {
        TemplateFormData {
            amount: 1800.0,
            description: "Rent".to_string(),
            day_of_month: Some(5),
            ..TemplateFormData::new_for(date!(2024 - 01 - 01))
        }
    }

    #[tokio::test]
    async fn can_create_template() {
        let state = get_test_state();

        let response = create_recurring_endpoint(State(state.clone()), Form(test_form()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::RECURRING_VIEW);

        let templates = get_all_templates(&state.db_connection.lock().unwrap())
            .expect("Could not retrieve templates");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].amount, 1800.0);
        assert_eq!(templates[0].description, "Rent");
        assert_eq!(templates[0].frequency, Frequency::Monthly);
        assert_eq!(templates[0].day_of_month.map(|day| day.get()), Some(5));
        assert!(templates[0].active);
    }

    #[tokio::test]
    async fn weekly_without_a_weekday_re_renders_the_form() {
        let state = get_test_state();
        let form = TemplateFormData {
            frequency: Frequency::Weekly,
            day_of_week: None,
            ..test_form()
        };

        let response = create_recurring_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: a weekly schedule needs an anchor day");

        let templates = get_all_templates(&state.db_connection.lock().unwrap())
            .expect("Could not retrieve templates");
        assert!(templates.is_empty());
    }

    #[tokio::test]
    async fn end_date_before_start_re_renders_the_form() {
        let state = get_test_state();
        let form = TemplateFormData {
            end_date: Some(date!(2023 - 12 - 31)),
            ..test_form()
        };

        let response = create_recurring_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: the end date must be after the start date");
    }

    #[tokio::test]
    async fn day_of_month_out_of_range_re_renders_the_form() {
        let state = get_test_state();
        let form = TemplateFormData {
            day_of_month: Some(40),
            ..test_form()
        };

        let response = create_recurring_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: 40 is not a valid day of the month");
    }
}
