//! Card edit page and update endpoint.

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
    card::{
        CardId,
        db::{get_card, update_card},
        domain::{CardDetails, CardFormData},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

/// The state needed for rendering the card edit page.
#[derive(Debug, Clone)]
pub struct EditCardPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn placeholder_form() -> CardFormData {
    CardFormData {
        name: String::new(),
        brand: String::new(),
        last_four: String::new(),
        limit: 0.0,
        current_invoice: 0.0,
        closing_day: 28,
        due_day: 5,
        theme: String::new(),
    }
}

/// Render the page for editing an existing card.
pub async fn get_edit_card_page(
    State(state): State<EditCardPageState>,
    Path(card_id): Path<CardId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let (form, error_message) = match get_card(card_id, &connection) {
        Ok(card) => (
            CardFormData {
                name: card.name.to_string(),
                brand: card.brand,
                last_four: card.last_four.to_string(),
                limit: card.limit,
                current_invoice: card.current_invoice,
                closing_day: card.closing_day.get(),
                due_day: card.due_day.get(),
                theme: card.theme.unwrap_or_default(),
            },
            String::new(),
        ),
        Err(Error::NotFound) => (placeholder_form(), "Card not found".to_string()),
        Err(error) => {
            tracing::error!("An unexpected error occurred while fetching a card: {error}");

            (placeholder_form(), "Failed to load card".to_string())
        }
    };

    Ok(edit_card_view(card_id, &form, &error_message).into_response())
}

/// The state needed for updating a card.
#[derive(Debug, Clone)]
pub struct UpdateCardEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCardEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle the form submission for updating a card.
pub async fn update_card_endpoint(
    State(state): State<UpdateCardEndpointState>,
    Path(card_id): Path<CardId>,
    Form(form_data): Form<CardFormData>,
) -> Response {
    let details = match CardDetails::new(&form_data) {
        Ok(details) => details,
        Err(error) => {
            return edit_card_form_view(card_id, &form_data, &format!("Error: {error}"))
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

    match update_card(card_id, details, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CARDS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a card: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_card_view(card_id: CardId, form: &CardFormData, error: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CARDS_VIEW).into_html();
    let form = edit_card_form_view(card_id, form, error);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Card", &[dollar_input_styles()], &content)
}

fn edit_card_form_view(card_id: CardId, form: &CardFormData, error_message: &str) -> Markup {
    let update_card_endpoint = endpoints::format_endpoint(endpoints::PUT_CARD, card_id);

    html! {
        form
            hx-put=(update_card_endpoint)
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
                    value=(form.name)
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
                    value=(form.brand)
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
                    value=(form.last_four)
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
                        value=(form.limit)
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
                        value=(form.current_invoice)
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
                    value=(form.closing_day)
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
                    value=(form.due_day)
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
                    value=(form.theme)
                    placeholder="midnight"
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
mod edit_card_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use rusqlite::Connection;

    use crate::{
        card::{
            create_card, create_card_table,
            domain::{CardDetails, CardFormData},
            edit::EditCardPageState,
            get_edit_card_page,
        },
        test_utils::{
            assert_form_input_with_value, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    fn get_edit_page_state() -> EditCardPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_card_table(&connection).expect("Could not create card table");

        EditCardPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn render_page_with_existing_card() {
        let state = get_edit_page_state();
        let details = CardDetails::new(&CardFormData {
            name: "Family Visa".to_string(),
            brand: "Visa".to_string(),
            last_four: "4242".to_string(),
            limit: 5_000.0,
            current_invoice: 1_200.0,
            closing_day: 28,
            due_day: 5,
            theme: "".to_string(),
        })
        .expect("Could not validate card details");
        create_card(details, &state.db_connection.lock().unwrap())
            .expect("Could not create test card");

        let response = get_edit_card_page(State(state), Path(1))
            .await
            .expect("Could not get edit card page");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "Family Visa");
        assert_form_input_with_value(&form, "last_four", "text", "4242");
        assert_form_input_with_value(&form, "limit", "number", "5000");
        assert_form_input_with_value(&form, "closing_day", "number", "28");
    }

    #[tokio::test]
    async fn render_page_with_invalid_id_shows_error() {
        let state = get_edit_page_state();

        let response = get_edit_card_page(State(state), Path(999))
            .await
            .expect("Could not get edit card page");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Card not found"),
            "page should report the missing card, got: {text}"
        );
    }
}

#[cfg(test)]
mod update_card_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        card::{
            create_card, create_card_table,
            domain::{CardDetails, CardFormData},
            edit::UpdateCardEndpointState,
            get_card, update_card_endpoint,
        },
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
    };

    fn get_update_state() -> UpdateCardEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_card_table(&connection).expect("Could not create card table");

        UpdateCardEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn test_form() -> CardFormData {
        CardFormData {
            name: "Family Visa".to_string(),
            brand: "Visa".to_string(),
            last_four: "4242".to_string(),
            limit: 5_000.0,
            current_invoice: 1_200.0,
            closing_day: 28,
            due_day: 5,
            theme: "".to_string(),
        }
    }

    #[tokio::test]
    async fn can_update_card() {
        let state = get_update_state();
        let details = CardDetails::new(&test_form()).expect("Could not validate card details");
        create_card(details, &state.db_connection.lock().unwrap())
            .expect("Could not create test card");

        let form = CardFormData {
            name: "Family Visa Platinum".to_string(),
            limit: 8_000.0,
            ..test_form()
        };

        let response = update_card_endpoint(State(state.clone()), Path(1), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CARDS_VIEW);

        let card =
            get_card(1, &state.db_connection.lock().unwrap()).expect("Could not get updated card");
        assert_eq!(card.name.as_ref(), "Family Visa Platinum");
        assert_eq!(card.limit, 8_000.0);
    }

    #[tokio::test]
    async fn update_card_endpoint_with_missing_id_is_a_no_op() {
        let state = get_update_state();

        let response = update_card_endpoint(State(state), Path(999), Form(test_form()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CARDS_VIEW);
    }

    #[tokio::test]
    async fn update_card_fails_on_invalid_last_four() {
        let state = get_update_state();
        let details = CardDetails::new(&test_form()).expect("Could not validate card details");
        create_card(details, &state.db_connection.lock().unwrap())
            .expect("Could not create test card");

        let form = CardFormData {
            last_four: "123".to_string(),
            ..test_form()
        };

        let response = update_card_endpoint(State(state), Path(1), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: card numbers must end in exactly four digits");
    }
}
