//! The page that lists transactions with filtering and pagination.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    account::{AccountId, get_all_accounts},
    card::{CardId, get_all_cards},
    endpoints,
    forms::{empty_as_none, empty_date_as_none},
    html::{
        CATEGORY_BADGE_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, PENDING_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, date_attr, edit_delete_action_links, format_currency, format_date,
    },
    member::{Member, MemberId, get_all_members},
    navigation::NavBar,
    pagination::{PageIndicator, PaginationConfig, page_count, page_indicators, page_start_index},
    transaction::{
        Transaction, TransactionKind, TransactionStatus,
        filter::{KindFilter, TransactionFilter},
        get_all_transactions,
    },
};

const PAGE_LINK_STYLE: &str = "flex items-center justify-center px-3 h-8 leading-tight \
    text-gray-500 bg-white border border-gray-300 hover:bg-gray-100 hover:text-gray-700 \
    dark:bg-gray-800 dark:border-gray-700 dark:text-gray-400 dark:hover:bg-gray-700 \
    dark:hover:text-white";

const PAGE_CURRENT_STYLE: &str = "flex items-center justify-center px-3 h-8 text-blue-600 \
    border border-gray-300 bg-blue-50 dark:bg-gray-700 dark:border-gray-700 dark:text-white";

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string of the transactions page.
///
/// Every field is optional so a bare `/transactions` shows the newest
/// transactions unfiltered. The same struct builds page links, keeping the
/// active filter when moving between pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionsQuery {
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub member: Option<MemberId>,
    pub kind: Option<KindFilter>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub end_date: Option<Date>,
}

impl TransactionsQuery {
    pub(crate) fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            member_id: self.member,
            kind: self.kind.unwrap_or_default(),
            search: self.search.clone().unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// The URL of `page` with the current filter applied.
    fn page_url(&self, page: u64) -> String {
        let query = Self {
            page: (page > 1).then_some(page),
            ..self.clone()
        };

        let encoded = serde_urlencoded::to_string(&query)
            .inspect_err(|error| {
                tracing::error!("Could not encode the transactions page URL: {error}");
            })
            .unwrap_or_default();

        if encoded.is_empty() {
            endpoints::TRANSACTIONS_VIEW.to_owned()
        } else {
            format!("{}?{encoded}", endpoints::TRANSACTIONS_VIEW)
        }
    }
}

/// A transaction with the display names its references resolve to.
#[derive(Debug, Clone)]
struct TransactionRow {
    transaction: Transaction,
    member_name: Option<String>,
    funding_source: Option<String>,
    edit_url: String,
    delete_url: String,
}

impl TransactionRow {
    fn new(
        transaction: Transaction,
        member_names: &HashMap<MemberId, String>,
        account_names: &HashMap<AccountId, String>,
        card_names: &HashMap<CardId, String>,
    ) -> Self {
        let member_name = transaction
            .member_id
            .and_then(|id| member_names.get(&id).cloned());
        let funding_source = match (transaction.account_id, transaction.card_id) {
            (Some(id), _) => account_names.get(&id).cloned(),
            (_, Some(id)) => card_names.get(&id).cloned(),
            _ => None,
        };

        Self {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id),
            member_name,
            funding_source,
            transaction,
        }
    }
}

/// Render the transactions page.
///
/// Transactions are filtered in memory after loading, so the text search and
/// the SQL-side ordering stay in one place each.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let members = get_all_members(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve members: {error}"))?;
    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve accounts: {error}"))?;
    let cards = get_all_cards(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve cards: {error}"))?;

    let member_names: HashMap<MemberId, String> = members
        .iter()
        .map(|member| (member.id, member.name.to_string()))
        .collect();
    let account_names: HashMap<AccountId, String> = accounts
        .iter()
        .map(|account| (account.id, account.name.to_string()))
        .collect();
    let card_names: HashMap<CardId, String> = cards
        .iter()
        .map(|card| (card.id, card.name.to_string()))
        .collect();

    let filter = query.filter();
    let filtered: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| filter.matches(transaction))
        .collect();

    let page_size = state.pagination_config.page_size;
    let page_count = page_count(filtered.len() as u64, page_size);
    let current_page = query.page.unwrap_or(1).clamp(1, page_count);

    let rows: Vec<TransactionRow> = filtered
        .into_iter()
        .skip(page_start_index(current_page, page_size) as usize)
        .take(page_size as usize)
        .map(|transaction| {
            TransactionRow::new(transaction, &member_names, &account_names, &card_names)
        })
        .collect();

    let indicators =
        page_indicators(current_page, page_count, state.pagination_config.max_indicators);

    Ok(transactions_view(&rows, &query, &members, &indicators, page_count).into_response())
}

fn delete_confirm_message(transaction: &Transaction) -> String {
    if transaction.description.is_empty() {
        "Are you sure you want to delete this transaction?".to_owned()
    } else {
        format!(
            "Are you sure you want to delete '{}'?",
            transaction.description
        )
    }
}

fn description_cell(transaction: &Transaction) -> Markup {
    html!(
        div class="flex items-center gap-2 flex-wrap"
        {
            span class="font-medium text-gray-900 dark:text-white"
            {
                @if transaction.description.is_empty() {
                    "—"
                } @else {
                    (transaction.description)
                }
            }

            @if transaction.installments.is_split() {
                span class="text-xs text-gray-500 dark:text-gray-400"
                {
                    "(" (transaction.installments.current()) "/"
                    (transaction.installments.total()) ")"
                }
            }

            @if transaction.status == TransactionStatus::Pending {
                span class=(PENDING_BADGE_STYLE) { "Pending" }
            }
        }
    )
}

fn category_cell(transaction: &Transaction) -> Markup {
    html!(
        @if transaction.category.is_empty() {
            span class="text-gray-400 dark:text-gray-500" { "—" }
        } @else {
            span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
        }
    )
}

fn amount_cell(transaction: &Transaction) -> Markup {
    let formatted = format_currency(transaction.amount);

    html!(
        @match transaction.kind {
            TransactionKind::Income => {
                span class="font-medium tabular-nums text-green-600 dark:text-green-400"
                {
                    "+" (formatted)
                }
            }
            TransactionKind::Expense => {
                span class="font-medium tabular-nums text-red-600 dark:text-red-400"
                {
                    "-" (formatted)
                }
            }
        }
    )
}

fn filter_bar(query: &TransactionsQuery, members: &[Member]) -> Markup {
    let kind = query.kind.unwrap_or_default();

    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid w-full gap-2 sm:grid-cols-2 lg:grid-cols-6 items-end text-sm"
        {
            select name="member" aria-label="Member" class=(FORM_SELECT_STYLE)
            {
                option value="" { "All members" }

                @for member in members {
                    option value=(member.id) selected[query.member == Some(member.id)] {
                        (member.name)
                    }
                }
            }

            select name="kind" aria-label="Kind" class=(FORM_SELECT_STYLE)
            {
                @for option in [KindFilter::All, KindFilter::Income, KindFilter::Expense] {
                    option value=(option.as_query_value()) selected[option == kind] {
                        (option.label())
                    }
                }
            }

            input
                type="search"
                name="search"
                aria-label="Search"
                placeholder="Search description or category"
                value=[query.search.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);

            input
                type="date"
                name="start_date"
                aria-label="From"
                value=[query.start_date.map(date_attr)]
                class=(FORM_TEXT_INPUT_STYLE);

            input
                type="date"
                name="end_date"
                aria-label="To"
                value=[query.end_date.map(date_attr)]
                class=(FORM_TEXT_INPUT_STYLE);

            button
                type="submit"
                class="px-4 py-2.5 rounded text-sm font-medium text-white bg-blue-500
                    dark:bg-blue-600 hover:bg-blue-600 hover:dark:bg-blue-700"
            {
                "Filter"
            }
        }
    )
}

fn pagination_nav(indicators: &[PageIndicator], query: &TransactionsQuery) -> Markup {
    html!(
        nav aria-label="Transaction pages" class="flex justify-center pt-4"
        {
            ul class="inline-flex items-center -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PageIndicator::Previous(page) => {
                                a href=(query.page_url(*page)) class=(PAGE_LINK_STYLE) { "Back" }
                            }
                            PageIndicator::Next(page) => {
                                a href=(query.page_url(*page)) class=(PAGE_LINK_STYLE) { "Next" }
                            }
                            PageIndicator::Page(page) => {
                                a href=(query.page_url(*page)) class=(PAGE_LINK_STYLE) { (page) }
                            }
                            PageIndicator::Current(page) => {
                                span aria-current="page" class=(PAGE_CURRENT_STYLE) { (page) }
                            }
                            PageIndicator::Gap => {
                                span class=(PAGE_LINK_STYLE) { "…" }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn transactions_view(
    rows: &[TransactionRow],
    query: &TransactionsQuery,
    members: &[Member],
    indicators: &[PageIndicator],
    page_count: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let new_transaction_route = endpoints::NEW_TRANSACTION_VIEW;

    let table_row = |row: &TransactionRow| {
        let transaction = &row.transaction;
        let confirm_message = delete_confirm_message(transaction);

        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (format_date(transaction.date))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (description_cell(transaction))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (category_cell(transaction))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @match &row.member_name {
                        Some(name) => { (name) }
                        None => { "—" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @match &row.funding_source {
                        Some(name) => { (name) }
                        None => { "—" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (amount_cell(transaction))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
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
            section class="space-y-4 w-full lg:max-w-6xl lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (filter_bar(query, members))

                (transactions_cards_view(rows, new_transaction_route))

                section class="hidden lg:block dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Member" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Source" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="7"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found. "
                                        a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE)
                                        {
                                            "Clear filters"
                                        }
                                        " or "
                                        a href=(new_transaction_route) class=(LINK_STYLE)
                                        {
                                            "add a transaction"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }

                @if page_count > 1 {
                    (pagination_nav(indicators, query))
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transactions_cards_view(rows: &[TransactionRow], new_transaction_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for row in rows {
                @let transaction = &row.transaction;
                @let confirm_message = delete_confirm_message(transaction);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-transaction-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        (description_cell(transaction))
                        (amount_cell(transaction))
                    }

                    div class="mt-2 flex items-center justify-between gap-3 text-sm"
                    {
                        span { (format_date(transaction.date)) }
                        (category_cell(transaction))
                    }

                    div class="mt-2 flex items-center justify-between gap-3 text-sm"
                    {
                        span
                        {
                            @match &row.member_name {
                                Some(name) => { (name) }
                                None => { "—" }
                            }
                        }

                        span
                        {
                            @match &row.funding_source {
                                Some(name) => { (name) }
                                None => { "—" }
                            }
                        }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &confirm_message,
                            "closest [data-transaction-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if rows.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No transactions found. "
                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "Add a transaction"
                    }
                }
            }
        }
    )
}
