//! Accounts listing page.

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
    account::{Account, AccountId, get_all_accounts},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the accounts listing page.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// An account with its formatted edit URL for template rendering.
#[derive(Debug, Clone)]
struct AccountWithEditUrl {
    pub account: Account,
    pub edit_url: String,
    pub transaction_count: u32,
}

/// Render the accounts listing page with transaction counts.
pub async fn get_accounts_page(State(state): State<AccountsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve accounts: {error}"))?;

    let transactions_per_account = count_transactions_per_account(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per account: {error}"),
    )?;

    let accounts_with_edit_urls = accounts
        .into_iter()
        .map(|account| {
            let transaction_count = *transactions_per_account.get(&account.id).unwrap_or(&0);

            AccountWithEditUrl {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id),
                account,
                transaction_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(accounts_view(&accounts_with_edit_urls).into_response())
}

fn count_transactions_per_account(
    connection: &Connection,
) -> Result<HashMap<AccountId, u32>, Error> {
    let result: Result<HashMap<AccountId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT account_id, COUNT(1) FROM \"transaction\"
            WHERE account_id IS NOT NULL GROUP BY account_id",
        )?
        .query_map((), |row| {
            let account_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((account_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn delete_confirm_message(account: &Account, transaction_count: u32) -> String {
    format!(
        "Are you sure you want to delete '{}'? {} transaction(s) will be kept without an account.",
        account.name, transaction_count
    )
}

fn account_name_cell(account: &Account) -> Markup {
    html!(
        div class="flex items-center gap-3"
        {
            @if let Some(color) = &account.color {
                span
                    class="inline-block h-3 w-3 rounded-full"
                    style=(format!("background-color: {color}"));
            }

            span class="font-medium text-gray-900 dark:text-white" { (account.name) }
        }
    )
}

fn accounts_view(accounts: &[AccountWithEditUrl]) -> Markup {
    let new_account_route = endpoints::NEW_ACCOUNT_VIEW;
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let table_row = |account_with_url: &AccountWithEditUrl| {
        let account = &account_with_url.account;
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_ACCOUNT, account.id);
        let confirm_message = delete_confirm_message(account, account_with_url.transaction_count);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (account_name_cell(account))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (account.institution)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="tabular-nums" { (format_currency(account.balance)) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (account_with_url.transaction_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &account_with_url.edit_url,
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
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(new_account_route) class=(LINK_STYLE)
                    {
                        "Create Account"
                    }
                }

                (accounts_cards_view(accounts, new_account_route))

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
                                    "Name"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Institution"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Balance"
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
                            @for account_with_url in accounts {
                                (table_row(account_with_url))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts added yet. "
                                        a href=(new_account_route) class=(LINK_STYLE)
                                        {
                                            "Add your first account"
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

    base("Accounts", &[], &content)
}

fn accounts_cards_view(accounts: &[AccountWithEditUrl], new_account_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for account_with_url in accounts {
                @let account = &account_with_url.account;
                @let delete_url =
                    endpoints::format_endpoint(endpoints::DELETE_ACCOUNT, account.id);
                @let confirm_message =
                    delete_confirm_message(account, account_with_url.transaction_count);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-account-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        (account_name_cell(account))
                        span class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (account.institution)
                        }
                    }

                    div class="mt-2 flex items-center justify-between gap-3 text-sm"
                    {
                        span class="tabular-nums text-gray-900 dark:text-white"
                        {
                            (format_currency(account.balance))
                        }

                        span { (account_with_url.transaction_count) " transaction(s)" }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &account_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-account-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if accounts.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No accounts added yet. "
                    a href=(new_account_route) class=(LINK_STYLE)
                    {
                        "Add your first account"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod accounts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        account::{AccountName, create_account, create_account_table},
        card::create_card_table,
        member::create_member_table,
        recurring::create_recurring_template_table,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{
            TransactionBuilder, TransactionKind, create_transaction, create_transaction_table,
        },
    };

    use super::{AccountsPageState, count_transactions_per_account, get_accounts_page};

    fn get_test_state() -> AccountsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_account_table(&connection).expect("Could not create account table");
        create_card_table(&connection).expect("Could not create card table");
        create_member_table(&connection).expect("Could not create member table");
        create_recurring_template_table(&connection)
            .expect("Could not create recurring template table");
        create_transaction_table(&connection).expect("Could not create transaction table");

        AccountsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_account_rows() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_account(
                AccountName::new_unchecked("Everyday"),
                "Kiwibank",
                1_250.75,
                None,
                &connection,
            )
            .expect("Could not create test account");
            create_account(
                AccountName::new_unchecked("Savings"),
                "ANZ",
                10_000.0,
                None,
                &connection,
            )
            .expect("Could not create test account");
        }

        let response = get_accounts_page(State(state))
            .await
            .expect("Could not get accounts page");
        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<String> = html
            .select(&row_selector)
            .map(|row| row.text().collect())
            .collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Everyday") && rows[0].contains("$1,250.75"));
        assert!(rows[1].contains("Savings") && rows[1].contains("$10,000.00"));
    }

    #[tokio::test]
    async fn renders_empty_state() {
        let state = get_test_state();

        let response = get_accounts_page(State(state))
            .await
            .expect("Could not get accounts page");

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();

        assert!(
            text.contains("No accounts added yet."),
            "page should show the empty state, got: {text}"
        );
    }

    #[test]
    fn counts_transactions_per_account() {
        let state = get_test_state();
        let connection = state.db_connection.lock().unwrap();

        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            "Kiwibank",
            0.0,
            None,
            &connection,
        )
        .expect("Could not create test account");

        for i in 1..=3_u8 {
            create_transaction(
                TransactionBuilder {
                    account_id: Some(account.id),
                    ..TransactionBuilder::new(
                        10.0 * f64::from(i),
                        date!(2024 - 03 - 05),
                        &i.to_string(),
                        TransactionKind::Expense,
                    )
                },
                &connection,
            )
            .expect("Could not create test transaction");
        }

        let counts = count_transactions_per_account(&connection)
            .expect("Could not count transactions per account");

        assert_eq!(counts.get(&account.id), Some(&3));
    }
}
