//! Categories listing page.

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
    AppState, Error, endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
    transaction::TransactionKind,
};

use super::{Category, get_all_categories};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category with its formatted edit URL for template rendering.
#[derive(Debug, Clone)]
struct CategoryWithEditUrl {
    pub category: Category,
    pub edit_url: String,
    pub transaction_count: u32,
}

/// Render the categories listing page with transaction counts.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transactions_per_category = count_transactions_per_category(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per category: {error}"),
    )?;

    let categories_with_edit_urls = categories
        .into_iter()
        .map(|category| {
            let transaction_count = *transactions_per_category
                .get(&(category.kind, category.name.to_string()))
                .unwrap_or(&0);

            CategoryWithEditUrl {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
                category,
                transaction_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&categories_with_edit_urls).into_response())
}

/// Count transactions grouped by kind and category name.
///
/// Transactions reference categories by name, so a renamed category
/// starts its count over.
fn count_transactions_per_category(
    connection: &Connection,
) -> Result<HashMap<(TransactionKind, String), u32>, Error> {
    let result: Result<HashMap<(TransactionKind, String), u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT kind, category, COUNT(1) FROM \"transaction\"
            WHERE category <> '' GROUP BY kind, category",
        )?
        .query_map((), |row| {
            let kind = row.get(0)?;
            let category = row.get(1)?;
            let count = row.get(2)?;

            Ok(((kind, category), count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn delete_confirm_message(category: &Category, transaction_count: u32) -> String {
    format!(
        "Are you sure you want to delete '{}'? {} transaction(s) will keep the category name.",
        category.name, transaction_count
    )
}

fn category_badge(category: &Category) -> Markup {
    let label = html!(
        @if let Some(icon) = &category.icon {
            span class="mr-1" { (icon) }
        }

        (category.name)
    );

    html!(
        @match &category.color {
            Some(color) => {
                span
                    class="inline-flex items-center px-2.5 py-0.5 rounded-full
                        text-xs font-medium text-white"
                    style=(format!("background-color: {color}"))
                {
                    (label)
                }
            }
            None => {
                span class=(CATEGORY_BADGE_STYLE) { (label) }
            }
        }
    )
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Income",
        TransactionKind::Expense => "Expense",
    }
}

fn categories_view(categories: &[CategoryWithEditUrl]) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |category_with_url: &CategoryWithEditUrl| {
        let category = &category_with_url.category;
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);
        let confirm_message =
            delete_confirm_message(category, category_with_url.transaction_count);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (category_badge(category))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (kind_label(category.kind))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (category_with_url.transaction_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &category_with_url.edit_url,
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
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create Category"
                    }
                }

                (categories_cards_view(categories, new_category_route))

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
                                    "Category"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Kind"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Transactions"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for category_with_url in categories {
                                (table_row(category_with_url))
                            }

                            @if categories.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories added yet. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Add your first category"
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

    base("Categories", &[], &content)
}

fn categories_cards_view(categories: &[CategoryWithEditUrl], new_category_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for category_with_url in categories {
                @let category = &category_with_url.category;
                @let delete_url =
                    endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);
                @let confirm_message =
                    delete_confirm_message(category, category_with_url.transaction_count);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-category-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        (category_badge(category))
                        span class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (kind_label(category.kind))
                        }
                    }

                    div class="mt-2 flex items-center justify-between gap-3 text-sm"
                    {
                        span { (category_with_url.transaction_count) " transaction(s)" }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &category_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-category-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if categories.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No categories added yet. "
                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Add your first category"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        account::create_account_table,
        card::create_card_table,
        category::{CategoryName, create_category, create_category_table},
        member::create_member_table,
        recurring::create_recurring_template_table,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{
            TransactionBuilder, TransactionKind, create_transaction, create_transaction_table,
        },
    };

    use super::{CategoriesPageState, count_transactions_per_category, get_categories_page};

    fn get_test_state() -> CategoriesPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");
        create_account_table(&connection).expect("Could not create account table");
        create_card_table(&connection).expect("Could not create card table");
        create_member_table(&connection).expect("Could not create member table");
        create_recurring_template_table(&connection)
            .expect("Could not create recurring template table");
        create_transaction_table(&connection).expect("Could not create transaction table");

        CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_category_rows() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                CategoryName::new_unchecked("Groceries"),
                TransactionKind::Expense,
                None,
                Some("#16a34a"),
                &connection,
            )
            .expect("Could not create test category");
            create_category(
                CategoryName::new_unchecked("Salary"),
                TransactionKind::Income,
                None,
                None,
                &connection,
            )
            .expect("Could not create test category");
        }

        let response = get_categories_page(State(state))
            .await
            .expect("Could not get categories page");
        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<String> = html
            .select(&row_selector)
            .map(|row| row.text().collect())
            .collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Salary") && rows[0].contains("Income"));
        assert!(rows[1].contains("Groceries") && rows[1].contains("Expense"));
    }

    #[tokio::test]
    async fn renders_empty_state() {
        let state = get_test_state();

        let response = get_categories_page(State(state))
            .await
            .expect("Could not get categories page");

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();

        assert!(
            text.contains("No categories added yet."),
            "page should show the empty state, got: {text}"
        );
    }

    #[test]
    fn counts_transactions_per_kind_and_name() {
        let state = get_test_state();
        let connection = state.db_connection.lock().unwrap();

        for description in ["weekly shop", "top up"] {
            create_transaction(
                TransactionBuilder {
                    category: "Groceries".to_string(),
                    ..TransactionBuilder::new(
                        42.0,
                        date!(2024 - 03 - 05),
                        description,
                        TransactionKind::Expense,
                    )
                },
                &connection,
            )
            .expect("Could not create test transaction");
        }

        create_transaction(
            TransactionBuilder {
                category: "Salary".to_string(),
                ..TransactionBuilder::new(
                    2_500.0,
                    date!(2024 - 03 - 01),
                    "march pay",
                    TransactionKind::Income,
                )
            },
            &connection,
        )
        .expect("Could not create test transaction");

        let counts = count_transactions_per_category(&connection)
            .expect("Could not count transactions per category");

        assert_eq!(
            counts.get(&(TransactionKind::Expense, "Groceries".to_string())),
            Some(&2)
        );
        assert_eq!(
            counts.get(&(TransactionKind::Income, "Salary".to_string())),
            Some(&1)
        );
        assert_eq!(counts.len(), 2);
    }
}
