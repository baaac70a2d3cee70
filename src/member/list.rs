//! Members listing page.

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
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    member::{Member, MemberId, get_all_members},
    navigation::NavBar,
};

/// The state needed for the members listing page.
#[derive(Debug, Clone)]
pub struct MembersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MembersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A member with its formatted edit URL for template rendering.
#[derive(Debug, Clone)]
struct MemberWithEditUrl {
    pub member: Member,
    pub edit_url: String,
    pub transaction_count: u32,
}

/// Render the members listing page with transaction counts.
pub async fn get_members_page(State(state): State<MembersPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let members = get_all_members(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve members: {error}"))?;

    let transactions_per_member = count_transactions_per_member(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per member: {error}"),
    )?;

    let members_with_edit_urls = members
        .into_iter()
        .map(|member| {
            let transaction_count = *transactions_per_member.get(&member.id).unwrap_or(&0);

            MemberWithEditUrl {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_MEMBER_VIEW, member.id),
                member,
                transaction_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(members_view(&members_with_edit_urls).into_response())
}

fn count_transactions_per_member(
    connection: &Connection,
) -> Result<HashMap<MemberId, u32>, Error> {
    let result: Result<HashMap<MemberId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT member_id, COUNT(1) FROM \"transaction\"
            WHERE member_id IS NOT NULL GROUP BY member_id",
        )?
        .query_map((), |row| {
            let member_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((member_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn delete_confirm_message(member: &Member, transaction_count: u32) -> String {
    format!(
        "Are you sure you want to delete '{}'? Their {} transaction(s) will be kept.",
        member.name, transaction_count
    )
}

fn member_name_cell(member: &Member) -> Markup {
    html!(
        div class="flex items-center gap-3"
        {
            @if let Some(avatar) = &member.avatar {
                img src=(avatar) alt="" class="h-8 w-8 rounded-full object-cover";
            }

            span class="font-medium text-gray-900 dark:text-white" { (member.name) }
        }
    )
}

fn members_view(members: &[MemberWithEditUrl]) -> Markup {
    let new_member_route = endpoints::NEW_MEMBER_VIEW;
    let nav_bar = NavBar::new(endpoints::MEMBERS_VIEW).into_html();

    let table_row = |member_with_url: &MemberWithEditUrl| {
        let member = &member_with_url.member;
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_MEMBER, member.id);
        let confirm_message = delete_confirm_message(member, member_with_url.transaction_count);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (member_name_cell(member))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (member.role)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @match member.monthly_income {
                        Some(income) => { (format_currency(income)) }
                        None => { "—" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (member_with_url.transaction_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &member_with_url.edit_url,
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
                    h1 class="text-xl font-bold" { "Members" }

                    a href=(new_member_route) class=(LINK_STYLE)
                    {
                        "Create Member"
                    }
                }

                (members_cards_view(members, new_member_route))

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
                                    "Role"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Monthly Income"
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
                            @for member_with_url in members {
                                (table_row(member_with_url))
                            }

                            @if members.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No members added yet. "
                                        a href=(new_member_route) class=(LINK_STYLE)
                                        {
                                            "Add your first member"
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

    base("Members", &[], &content)
}

fn members_cards_view(members: &[MemberWithEditUrl], new_member_route: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for member_with_url in members {
                @let member = &member_with_url.member;
                @let delete_url =
                    endpoints::format_endpoint(endpoints::DELETE_MEMBER, member.id);
                @let confirm_message =
                    delete_confirm_message(member, member_with_url.transaction_count);

                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-member-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        (member_name_cell(member))
                        span class="text-sm text-gray-500 dark:text-gray-400" { (member.role) }
                    }

                    div class="mt-2 flex items-center justify-between gap-3 text-sm"
                    {
                        span class="tabular-nums text-gray-900 dark:text-white"
                        {
                            @match member.monthly_income {
                                Some(income) => { (format_currency(income)) }
                                None => { "—" }
                            }
                        }

                        span { (member_with_url.transaction_count) " transaction(s)" }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &member_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-member-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if members.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No members added yet. "
                    a href=(new_member_route) class=(LINK_STYLE)
                    {
                        "Add your first member"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod members_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        account::create_account_table,
        card::create_card_table,
        member::{MemberName, create_member, create_member_table},
        recurring::create_recurring_template_table,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{
            TransactionBuilder, TransactionKind, create_transaction, create_transaction_table,
        },
    };

    use super::{MembersPageState, count_transactions_per_member, get_members_page};

    fn get_members_page_state() -> MembersPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_member_table(&connection).expect("Could not create member table");
        create_account_table(&connection).expect("Could not create account table");
        create_card_table(&connection).expect("Could not create card table");
        create_recurring_template_table(&connection)
            .expect("Could not create recurring template table");
        create_transaction_table(&connection).expect("Could not create transaction table");

        MembersPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_member_rows() {
        let state = get_members_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_member(
                MemberName::new_unchecked("Alex"),
                "Parent",
                None,
                Some(4200.0),
                &connection,
            )
            .expect("Could not create test member");
            create_member(MemberName::new_unchecked("Sam"), "Child", None, None, &connection)
                .expect("Could not create test member");
        }

        let response = get_members_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Alex"), "member name missing from page");
        assert!(text.contains("$4,200.00"), "monthly income missing from page");
    }

    #[tokio::test]
    async fn renders_empty_state() {
        let state = get_members_page_state();

        let response = get_members_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No members added yet."));
    }

    #[test]
    fn counts_transactions_per_member() {
        let state = get_members_page_state();
        let connection = state.db_connection.lock().unwrap();
        let member = create_member(
            MemberName::new_unchecked("Alex"),
            "Parent",
            None,
            None,
            &connection,
        )
        .expect("Could not create test member");

        for i in 0..3 {
            create_transaction(
                TransactionBuilder {
                    member_id: Some(member.id),
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
        create_transaction(
            TransactionBuilder::new(
                5.0,
                date!(2024 - 03 - 06),
                "untracked",
                TransactionKind::Expense,
            ),
            &connection,
        )
        .expect("Could not create test transaction");

        let counts = count_transactions_per_member(&connection).unwrap();

        assert_eq!(counts[&member.id], 3);
        assert_eq!(counts.len(), 1);
    }
}
