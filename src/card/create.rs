//! Card creation page and endpoint.

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
    card::{
        create_card,
        domain::{CardDetails, CardFormData},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

/// The state needed for creating a card.
#[derive(Debug, Clone)]
pub struct CreateCardEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCardEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the card creation page.
pub async fn get_new_card_page() -> Response {
    new_card_view().into_response()
}

/// Handle card creation form submission.
pub async fn create_card_endpoint(
    State(state): State<CreateCardEndpointState>,
    Form(new_card): Form<CardFormData>,
) -> Response {
    let details = match CardDetails::new(&new_card) {
        Ok(details) => details,
        Err(error) => {
            return new_card_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_card(details, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CARDS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a card: {error}");

            error.into_alert_response()
        }
    }
}

fn new_card_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CARD_VIEW).into_html();
    let form = new_card_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Card", &[dollar_input_styles()], &content)
}

fn new_card_form_view(error_message: &str) -> Markup {
    let create_card_endpoint = endpoints::POST_CARD;

    html! {
        form
            hx-post=(create_card_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Card Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Card Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="brand"
                    class=(FORM_LABEL_STYLE)
                {
                    "Brand"
                }

                input
                    id="brand"
                    type="text"
                    name="brand"
                    placeholder="Visa, Mastercard, ..."
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="last_four"
                    class=(FORM_LABEL_STYLE)
                {
                    "Last Four Digits"
                }

                input
                    id="last_four"
                    type="text"
                    name="last_four"
                    placeholder="4242"
                    inputmode="numeric"
                    maxlength="4"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="limit"
                    class=(FORM_LABEL_STYLE)
                {
                    "Credit Limit"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="limit"
                        type="number"
                        name="limit"
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
                    for="current_invoice"
                    class=(FORM_LABEL_STYLE)
                {
                    "Current Statement Balance"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="current_invoice"
                        type="number"
                        name="current_invoice"
                        value="0.00"
                        step="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label
                    for="closing_day"
                    class=(FORM_LABEL_STYLE)
                {
                    "Statement Closing Day"
                }

                input
                    id="closing_day"
                    type="number"
                    name="closing_day"
                    value="28"
                    min="1"
                    max="31"
                    step="1"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="due_day"
                    class=(FORM_LABEL_STYLE)
                {
                    "Payment Due Day"
                }

                input
                    id="due_day"
                    type="number"
                    name="due_day"
                    value="5"
                    min="1"
                    max="31"
                    step="1"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="theme"
                    class=(FORM_LABEL_STYLE)
                {
                    "Theme (optional)"
                }

                input
                    id="theme"
                    type="text"
                    name="theme"
                    placeholder="midnight"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Card" }
        }
    }
}
