//! Goals listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    goal::{Goal, get_all_goals},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency, format_date,
    },
    navigation::NavBar,
};

/// The state needed for the goals listing page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A goal with its formatted edit URL for template rendering.
#[derive(Debug, Clone)]
struct GoalWithEditUrl {
    pub goal: Goal,
    pub edit_url: String,
}

/// Render the goals listing page with progress bars.
pub async fn get_goals_page(State(state): State<GoalsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_all_goals(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve goals: {error}"))?;

    let goals_with_edit_urls = goals
        .into_iter()
        .map(|goal| GoalWithEditUrl {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id),
            goal,
        })
        .collect::<Vec<_>>();

    Ok(goals_view(&goals_with_edit_urls).into_response())
}

fn delete_confirm_message(goal: &Goal) -> String {
    format!("Are you sure you want to delete '{}'?", goal.name)
}

fn goal_name_cell(goal: &Goal) -> Markup {
    html!(
        div class="flex items-center gap-3"
        {
            @if let Some(image) = &goal.image {
                img src=(image) alt="" class="h-8 w-8 rounded object-cover";
            }

            div class="flex flex-col"
            {
                span class="font-medium text-gray-900 dark:text-white" { (goal.name) }

                @if !goal.category.is_empty() {
                    span class="text-xs text-gray-500 dark:text-gray-400" { (goal.category) }
                }
            }
        }
    )
}

/// Render the progress of a goal.
///
/// The bar is clamped to full, so an overfunded goal simply shows as
/// complete.
fn progress_bar(goal: &Goal) -> Markup {
    let fraction = goal.progress_fraction();
    let bar_percent = (fraction.clamp(0.0, 1.0) * 100.0).round();
    let bar_style = if fraction >= 1.0 {
        "h-2.5 rounded-full bg-green-600"
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

            span class="text-xs tabular-nums" { (bar_percent) "%" }
        }
    )
}

fn goals_view(goals: &[GoalWithEditUrl]) -> Markup {
    let new_goal_route = endpoints::NEW_GOAL_VIEW;
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let table_row = |goal_with_url: &GoalWithEditUrl| {
        let goal = &goal_with_url.goal;
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_GOAL, goal.id);
        let confirm_message = delete_confirm_message(goal);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (goal_name_cell(goal))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="tabular-nums"
                    {
                        (format_currency(goal.saved)) " of " (format_currency(goal.target))
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (progress_bar(goal))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_date(goal.deadline))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &goal_with_url.edit_url,
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
                    h1 class="text-xl font-bold" { "Goals" }

                    a href=(new_goal_route) class=(LINK_STYLE)
                    {
                        "Create Goal"
                    }
                }

                (goals_cards_view(goals, new_goal_route))

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
                                    "Goal"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Saved"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Progress"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Deadline"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for goal_with_url in goals {
                                (table_row(goal_with_url))
                            }

                            @if goals.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No goals added yet. "
                                        a href=(new_goal_route) class=(LINK_STYLE)
                                        {
                                            "Add your first goal"
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

    base("Goals", &[], &content)
}

fn goals_cards_view(goals: &[GoalWithEditUrl], new_goal_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for goal_with_url in goals {
                @let goal = &goal_with_url.goal;
                @let delete_url = endpoints::format_endpoint(endpoints::DELETE_GOAL, goal.id);
                @let confirm_message = delete_confirm_message(goal);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-goal-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        (goal_name_cell(goal))
                        span class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (format_date(goal.deadline))
                        }
                    }

                    div class="mt-2" { (progress_bar(goal)) }

                    div class="mt-2 flex items-center justify-between gap-3 text-sm"
                    {
                        span class="tabular-nums text-gray-900 dark:text-white"
                        {
                            (format_currency(goal.saved)) " of " (format_currency(goal.target))
                        }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &goal_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-goal-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if goals.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No goals added yet. "
                    a href=(new_goal_route) class=(LINK_STYLE)
                    {
                        "Add your first goal"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod goals_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        goal::{GoalName, create_goal, create_goal_table},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{GoalsPageState, get_goals_page};

    fn get_test_state() -> GoalsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_goal_table(&connection).expect("Could not create goal table");

        GoalsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_goal_rows() {
        let state = get_test_state();
        create_goal(
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            2_000.0,
            date!(2026 - 12 - 31),
            "travel",
            None,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test goal");

        let response = get_goals_page(State(state))
            .await
            .expect("Could not get goals page");
        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<String> = html
            .select(&row_selector)
            .map(|row| row.text().collect())
            .collect();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("Japan Trip"));
        assert!(rows[0].contains("$2,000.00 of $8,000.00"));
        assert!(rows[0].contains("25%"));
        assert!(rows[0].contains("31 Dec 2026"));
    }

    #[tokio::test]
    async fn renders_empty_state() {
        let state = get_test_state();

        let response = get_goals_page(State(state))
            .await
            .expect("Could not get goals page");

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();

        assert!(
            text.contains("No goals added yet."),
            "page should show the empty state, got: {text}"
        );
    }
}
