//! Dashboard HTTP handler and view rendering.
//!
//! The dashboard summarises the filtered window: headline stats, a monthly
//! cash flow chart, spending by category and the category breakdown cards.
//! The window defaults to the current month and is shared with the filter
//! bar via the query string, so views are bookmarkable.

use std::sync::{Arc, Mutex};

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
    account::{Account, get_all_accounts},
    card::{Card, get_all_cards},
    dashboard::{
        aggregation::{
            category_percentage, expenses_by_category, expenses_for_period, income_for_period,
            monthly_cash_flow, savings_rate, total_balance,
        },
        cards::{CategoryShare, category_breakdown_view, stat_cards_view},
        charts::{DashboardChart, cash_flow_chart, category_spending_chart, charts_script},
    },
    endpoints,
    forms::{empty_as_none, empty_date_as_none},
    html::{
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE,
        base, date_attr,
    },
    member::{Member, MemberId, get_all_members},
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{
        DateRange, KindFilter, QuickRange, Transaction, TransactionFilter, get_all_transactions,
    },
};

const QUICK_RANGE_LINK_STYLE: &str = "px-3 py-1 rounded-full text-sm border border-gray-300 \
    text-gray-600 hover:bg-gray-100 hover:text-gray-900 dark:border-gray-700 \
    dark:text-gray-400 dark:hover:bg-gray-700 dark:hover:text-white";

const QUICK_RANGE_CURRENT_STYLE: &str = "px-3 py-1 rounded-full text-sm border border-blue-500 \
    bg-blue-50 text-blue-600 dark:bg-gray-700 dark:text-white";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions, accounts and cards.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of the dashboard page.
///
/// Every field is optional so a bare `/dashboard` shows the current month.
/// The same struct builds the quick range links, keeping the active filter
/// when jumping between periods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub member: Option<MemberId>,
    pub kind: Option<KindFilter>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub end_date: Option<Date>,
}

impl DashboardQuery {
    /// The filter for the dashboard window.
    ///
    /// When neither date is set the window defaults to the current month.
    /// Setting either date replaces both defaults at once, so a half-set
    /// range behaves as an open bound rather than being clipped to a month.
    fn filter(&self, today: Date) -> TransactionFilter {
        let (start_date, end_date) = if self.start_date.is_none() && self.end_date.is_none() {
            let range = QuickRange::ThisMonth.range(today);
            (Some(range.start), Some(range.end))
        } else {
            (self.start_date, self.end_date)
        };

        TransactionFilter {
            member_id: self.member,
            kind: self.kind.unwrap_or_default(),
            search: self.search.clone().unwrap_or_default(),
            start_date,
            end_date,
        }
    }

    /// The URL showing `range` with the rest of the filter kept.
    fn range_url(&self, range: DateRange) -> String {
        let query = Self {
            start_date: Some(range.start),
            end_date: Some(range.end),
            ..self.clone()
        };

        let encoded = serde_urlencoded::to_string(&query)
            .inspect_err(|error| {
                tracing::error!("Could not encode the dashboard URL: {error}");
            })
            .unwrap_or_default();

        if encoded.is_empty() {
            endpoints::DASHBOARD_VIEW.to_owned()
        } else {
            format!("{}?{encoded}", endpoints::DASHBOARD_VIEW)
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    total_balance: f64,
    income: f64,
    expenses: f64,
    savings_rate: f64,
    category_shares: Vec<CategoryShare>,
    charts: [DashboardChart; 2],
    window_is_empty: bool,
}

/// Display an overview of the family's finances.
///
/// The stats, charts and category breakdown cover the filtered window; the
/// total balance is always the snapshot across every account and card.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let today = local_date_today(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not determine the local date: {error}"))?;

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

    let filter = query.filter(today);
    let window: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| filter.matches(transaction))
        .collect();

    let data = build_dashboard_data(&window, &accounts, &cards);

    Ok(dashboard_view(&data, &query, &filter, &members, today).into_response())
}

/// Computes the stats, breakdown and charts for the filtered window.
fn build_dashboard_data(
    transactions: &[Transaction],
    accounts: &[Account],
    cards: &[Card],
) -> DashboardData {
    let income = income_for_period(transactions);
    let expenses = expenses_for_period(transactions);

    let category_totals = expenses_by_category(transactions);
    let category_shares = category_totals
        .iter()
        .map(|(name, amount)| CategoryShare {
            name: name.clone(),
            amount: *amount,
            share_of_income: category_percentage(*amount, income),
        })
        .collect();

    let charts = [
        DashboardChart {
            id: "cash-flow-chart",
            options: cash_flow_chart(&monthly_cash_flow(transactions)).to_string(),
        },
        DashboardChart {
            id: "category-spending-chart",
            options: category_spending_chart(&category_totals).to_string(),
        },
    ];

    DashboardData {
        total_balance: total_balance(accounts, cards),
        income,
        expenses,
        savings_rate: savings_rate(income, expenses),
        category_shares,
        charts,
        window_is_empty: transactions.is_empty(),
    }
}

/// The quick range links, with the active preset shown as plain text.
fn quick_range_links(query: &DashboardQuery, filter: &TransactionFilter, today: Date) -> Markup {
    html!(
        nav aria-label="Quick ranges" class="flex flex-wrap gap-2"
        {
            @for preset in QuickRange::ALL {
                @let range = preset.range(today);
                @let is_current = filter.start_date == Some(range.start)
                    && filter.end_date == Some(range.end);

                @if is_current {
                    span aria-current="true" class=(QUICK_RANGE_CURRENT_STYLE)
                    {
                        (preset.label())
                    }
                } @else {
                    a href=(query.range_url(range)) class=(QUICK_RANGE_LINK_STYLE)
                    {
                        (preset.label())
                    }
                }
            }
        }
    )
}

/// The filter bar, showing the effective window dates rather than the raw
/// query so the default month is visible (and editable) on a bare load.
fn filter_bar(query: &DashboardQuery, filter: &TransactionFilter, members: &[Member]) -> Markup {
    let kind = query.kind.unwrap_or_default();

    html!(
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
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
                value=[filter.start_date.map(date_attr)]
                class=(FORM_TEXT_INPUT_STYLE);

            input
                type="date"
                name="end_date"
                aria-label="To"
                value=[filter.end_date.map(date_attr)]
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

/// Renders the dashboard page.
fn dashboard_view(
    data: &DashboardData,
    query: &DashboardQuery,
    filter: &TransactionFilter,
    members: &[Member],
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    h1 class="text-xl font-bold" { "Dashboard" }

                    (quick_range_links(query, filter, today))
                }

                (filter_bar(query, filter, members))

                (stat_cards_view(
                    data.total_balance,
                    data.income,
                    data.expenses,
                    data.savings_rate,
                ))

                @if data.window_is_empty {
                    p class="text-center text-gray-500 dark:text-gray-400 py-8"
                    {
                        "No transactions in this period. Adjust the filter or "
                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                        {
                            "add a transaction"
                        }
                        "."
                    }
                } @else {
                    section id="charts" class="w-full mx-auto mt-4"
                    {
                        div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                        {
                            @for chart in &data.charts {
                                div
                                    id=(chart.id)
                                    class="min-h-[380px] rounded dark:bg-gray-100"
                                {}
                            }
                        }
                    }

                    (category_breakdown_view(&data.category_shares))
                }
            }
        }
    );

    // An empty window renders no chart containers, so the chart scripts
    // would throw on the missing elements.
    let scripts = if data.window_is_empty {
        vec![]
    } else {
        vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            charts_script(&data.charts),
        ]
    };

    base("Dashboard", &scripts, &content)
}
