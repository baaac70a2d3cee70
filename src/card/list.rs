//! Cards listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    card::{Card, CardId, get_all_cards},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the cards listing page.
#[derive(Debug, Clone)]
pub struct CardsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CardsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A card with its formatted edit URL for template rendering.
#[derive(Debug, Clone)]
struct CardWithEditUrl {
    pub card: Card,
    pub edit_url: String,
    pub transaction_count: u32,
}

/// Render the cards listing page with statement usage bars.
pub async fn get_cards_page(State(state): State<CardsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let cards = get_all_cards(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve cards: {error}"))?;

    let transactions_per_card = count_transactions_per_card(&connection)
        .inspect_err(|error| tracing::error!("Could not count transactions per card: {error}"))?;

    let cards_with_edit_urls = cards
        .into_iter()
        .map(|card| {
            let transaction_count = *transactions_per_card.get(&card.id).unwrap_or(&0);

            CardWithEditUrl {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_CARD_VIEW, card.id),
                card,
                transaction_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(cards_view(&cards_with_edit_urls).into_response())
}

fn count_transactions_per_card(connection: &Connection) -> Result<HashMap<CardId, u32>, Error> {
    let result: Result<HashMap<CardId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT card_id, COUNT(1) FROM \"transaction\"
            WHERE card_id IS NOT NULL GROUP BY card_id",
        )?
        .query_map((), |row| {
            let card_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((card_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn delete_confirm_message(card: &Card, transaction_count: u32) -> String {
    format!(
        "Are you sure you want to delete '{}'? {} transaction(s) will be kept without a card.",
        card.name, transaction_count
    )
}

fn card_name_cell(card: &Card) -> Markup {
    html!(
        div class="flex flex-col"
        {
            span class="font-medium text-gray-900 dark:text-white" { (card.name) }
            span class="text-xs text-gray-500 dark:text-gray-400"
            {
                (card.brand) " •••• " (card.last_four)
            }
        }
    )
}

/// Render the statement usage of a card.
///
/// The bar is clamped to full, the percentage text is not, so an
/// over-limit card shows a full red bar with a figure above 100%.
fn usage_bar(card: &Card) -> Markup {
    let fraction = card.usage_fraction();
    let bar_percent = (fraction.clamp(0.0, 1.0) * 100.0).round();
    let text_percent = (fraction * 100.0).round();
    let bar_style = if fraction > 1.0 {
        "h-2.5 rounded-full bg-red-600"
    } else {
        "h-2.5 rounded-full bg-blue-600"
    };

    html!(
        div class="flex items-center gap-2"
        {
            div class="h-2.5 w-24 rounded-full bg-gray-200 dark:bg-gray-700"
            {
                div class=(bar_style) style=(format!("width: {bar_percent}%"));
            }

            span class="text-xs tabular-nums" { (text_percent) "%" }
        }
    )
}

fn cards_view(cards: &[CardWithEditUrl]) -> Markup {
    let new_card_route = endpoints::NEW_CARD_VIEW;
    let nav_bar = NavBar::new(endpoints::CARDS_VIEW).into_html();

    let table_row = |card_with_url: &CardWithEditUrl| {
        let card = &card_with_url.card;
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CARD, card.id);
        let confirm_message = delete_confirm_message(card, card_with_url.transaction_count);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (card_name_cell(card))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="tabular-nums" { (format_currency(card.current_invoice)) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="tabular-nums" { (format_currency(card.limit)) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (usage_bar(card))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    "Closes " (card.closing_day) ", due " (card.due_day)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &card_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Cards" }

                    a href=(new_card_route) class=(LINK_STYLE)
                    {
                        "Create Card"
                    }
                }

                (cards_cards_view(cards, new_card_route))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Card"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Statement"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Limit"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Usage"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Statement Days"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for card_with_url in cards {
                                (table_row(card_with_url))
                            }

                            @if cards.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No cards added yet. "
                                        a href=(new_card_route) class=(LINK_STYLE)
                                        {
                                            "Add your first card"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Cards", &[], &content)
}

fn cards_cards_view(cards: &[CardWithEditUrl], new_card_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for card_with_url in cards {
                @let card = &card_with_url.card;
                @let delete_url = endpoints::format_endpoint(endpoints::DELETE_CARD, card.id);
                @let confirm_message =
                    delete_confirm_message(card, card_with_url.transaction_count);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-card-card="true"
                    data-theme=[card.theme.as_deref()]
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        (card_name_cell(card))
                        span class="tabular-nums text-gray-900 dark:text-white"
                        {
                            (format_currency(card.current_invoice))
                        }
                    }

                    div class="mt-2" { (usage_bar(card)) }

                    div class="mt-2 flex items-center justify-between gap-3 text-sm"
                    {
                        span { "Closes " (card.closing_day) ", due " (card.due_day) }
                        span { (card_with_url.transaction_count) " transaction(s)" }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &card_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-card-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if cards.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No cards added yet. "
                    a href=(new_card_route) class=(LINK_STYLE)
                    {
                        "Add your first card"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod cards_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        card::{
            create_card, create_card_table,
            domain::{CardDetails, CardFormData},
        },
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{CardsPageState, get_cards_page};

    fn get_test_state() -> CardsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_card_table(&connection).expect("Could not create card table");
        crate::transaction::create_transaction_table(&connection)
            .expect("Could not create transaction table");

        CardsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn test_details(name: &str, limit: f64, current_invoice: f64) -> CardDetails {
        CardDetails::new(&CardFormData {
            name: name.to_string(),
            brand: "Visa".to_string(),
            last_four: "4242".to_string(),
            limit,
            current_invoice,
            closing_day: 28,
            due_day: 5,
            theme: "".to_string(),
        })
        .expect("Could not validate card details")
    }

    #[tokio::test]
    async fn renders_card_rows() {
        let state = get_test_state();
        create_card(
            test_details("Family Visa", 5_000.0, 1_250.0),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test card");

        let response = get_cards_page(State(state))
            .await
            .expect("Could not get cards page");
        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<String> = html
            .select(&row_selector)
            .map(|row| row.text().collect())
            .collect();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("Family Visa"));
        assert!(rows[0].contains("•••• 4242"));
        assert!(rows[0].contains("$5,000.00"));
        assert!(rows[0].contains("25%"));
    }

    #[tokio::test]
    async fn over_limit_usage_bar_is_clamped_for_display() {
        let state = get_test_state();
        create_card(
            test_details("Family Visa", 1_000.0, 1_500.0),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test card");

        let response = get_cards_page(State(state))
            .await
            .expect("Could not get cards page");

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        let raw = html.html();

        assert!(
            text.contains("150%"),
            "usage text should be unclamped, got: {text}"
        );
        assert!(
            raw.contains("width: 100%"),
            "usage bar width should be clamped to 100%"
        );
    }

    #[tokio::test]
    async fn renders_empty_state() {
        let state = get_test_state();

        let response = get_cards_page(State(state))
            .await
            .expect("Could not get cards page");

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();

        assert!(
            text.contains("No cards added yet."),
            "page should show the empty state, got: {text}"
        );
    }
}
