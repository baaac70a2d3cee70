//! The recurring transactions list page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
        format_date, format_day_month,
    },
    navigation::NavBar,
    recurring::{Frequency, RecurringTemplate, get_all_templates},
    transaction::TransactionKind,
};

const ACTIVE_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-green-800 bg-green-100 rounded-full \
    dark:bg-green-900 dark:text-green-300";

const PAUSED_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-gray-800 bg-gray-100 rounded-full \
    dark:bg-gray-700 dark:text-gray-300";

/// The state needed for the recurring transactions page.
#[derive(Debug, Clone)]
pub struct RecurringPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurringPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page listing all recurring templates.
pub async fn get_recurring_page(State(state): State<RecurringPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let templates = get_all_templates(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve recurring templates: {error}"))?;

    Ok(recurring_view(&templates).into_response())
}

fn schedule_summary(template: &RecurringTemplate) -> String {
    match template.frequency {
        Frequency::Daily => "Daily".to_owned(),
        Frequency::Weekly => match template.day_of_week {
            Some(weekday) => format!("Weekly on {weekday}"),
            None => "Weekly".to_owned(),
        },
        Frequency::Monthly => match template.day_of_month {
            Some(day) => format!("Monthly on day {day}"),
            None => "Monthly".to_owned(),
        },
        Frequency::Yearly => format!("Yearly on {}", format_day_month(template.start_date)),
    }
}

fn delete_confirm_message(template: &RecurringTemplate) -> String {
    let subject = if template.description.is_empty() {
        "this recurring transaction".to_owned()
    } else {
        format!("the recurring transaction '{}'", template.description)
    };

    format!(
        "Are you sure you want to delete {subject}? \
        Transactions already created from it will be kept."
    )
}

fn amount_cell(template: &RecurringTemplate) -> Markup {
    html!(
        @match template.kind {
            TransactionKind::Income => {
                span class="text-green-600 dark:text-green-400 tabular-nums"
                {
                    "+" (format_currency(template.amount))
                }
            }
            TransactionKind::Expense => {
                span class="text-red-600 dark:text-red-400 tabular-nums"
                {
                    "-" (format_currency(template.amount))
                }
            }
        }
    )
}

fn status_badge(template: &RecurringTemplate) -> Markup {
    html!(
        @if template.active {
            span class=(ACTIVE_BADGE_STYLE) { "Active" }
        } @else {
            span class=(PAUSED_BADGE_STYLE) { "Paused" }
        }
    )
}

fn last_generated_cell(template: &RecurringTemplate) -> Markup {
    html!(
        @match template.last_materialized {
            Some(date) => { (format_date(date)) }
            None => { "Never" }
        }
    )
}

fn recurring_view(templates: &[RecurringTemplate]) -> Markup {
    let nav_bar = NavBar::new(endpoints::RECURRING_VIEW).into_html();

    let table_row = |template: &RecurringTemplate| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_RECURRING_VIEW, template.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_RECURRING, template.id);
        let confirm_message = delete_confirm_message(template);

        html!(
            tr class=(TABLE_ROW_STYLE) data-template-row="true"
            {
                td class=(TABLE_CELL_STYLE)
                {
                    @if template.description.is_empty() {
                        "—"
                    } @else {
                        (template.description)
                    }
                }

                td class=(TABLE_CELL_STYLE) { (amount_cell(template)) }

                td class=(TABLE_CELL_STYLE) { (schedule_summary(template)) }

                td class=(TABLE_CELL_STYLE) { (status_badge(template)) }

                td class=(TABLE_CELL_STYLE) { (last_generated_cell(template)) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
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
            section class="space-y-4 w-full lg:max-w-6xl lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Recurring Transactions" }

                    div class="flex items-center gap-4"
                    {
                        button
                            type="button"
                            hx-post=(endpoints::SYNC_RECURRING)
                            hx-swap="none"
                            hx-target-error="#alert-container"
                            class=(BUTTON_PRIMARY_STYLE)
                        {
                            "Sync now"
                        }

                        a href=(endpoints::NEW_RECURRING_VIEW) class=(LINK_STYLE)
                        {
                            "Create Recurring Transaction"
                        }
                    }
                }

                (recurring_cards_view(templates))

                section class="hidden lg:block dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Schedule" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Last generated" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for template in templates {
                                (table_row(template))
                            }

                            @if templates.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No recurring transactions yet. "
                                        a
                                            href=(endpoints::NEW_RECURRING_VIEW)
                                            class=(LINK_STYLE)
                                        {
                                            "Create one"
                                        }
                                        " for bills and salaries that repeat."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Recurring Transactions", &[], &content)
}

fn recurring_cards_view(templates: &[RecurringTemplate]) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for template in templates {
                @let edit_url =
                    endpoints::format_endpoint(endpoints::EDIT_RECURRING_VIEW, template.id);
                @let delete_url =
                    endpoints::format_endpoint(endpoints::DELETE_RECURRING, template.id);
                @let confirm_message = delete_confirm_message(template);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-template-card="true"
                {
                    div class="flex justify-between items-start gap-2"
                    {
                        div
                        {
                            p class="font-semibold"
                            {
                                @if template.description.is_empty() {
                                    "—"
                                } @else {
                                    (template.description)
                                }
                            }

                            p class="text-sm text-gray-500 dark:text-gray-400"
                            {
                                (schedule_summary(template))
                            }
                        }

                        (amount_cell(template))
                    }

                    div class="mt-2 flex items-center gap-2 text-sm"
                    {
                        (status_badge(template))

                        span class="text-gray-500 dark:text-gray-400"
                        {
                            "Last generated: " (last_generated_cell(template))
                        }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-template-card='true']",
                            "delete",
                        ))
                    }
                }
            }

            @if templates.is_empty() {
                li class="text-center text-gray-500 dark:text-gray-400"
                {
                    "No recurring transactions yet. "
                    a href=(endpoints::NEW_RECURRING_VIEW) class=(LINK_STYLE) { "Create one" }
                    " for bills and salaries that repeat."
                }
            }
        }
    )
}
