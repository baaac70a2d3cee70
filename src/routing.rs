//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, get_accounts_page, get_edit_account_page,
        get_new_account_page, update_account_endpoint,
    },
    card::{
        create_card_endpoint, delete_card_endpoint, get_cards_page, get_edit_card_page,
        get_new_card_page, update_card_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, get_new_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, get_edit_goal_page, get_goals_page,
        get_new_goal_page, update_goal_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    member::{
        create_member_endpoint, delete_member_endpoint, get_edit_member_page, get_members_page,
        get_new_member_page, update_member_endpoint,
    },
    not_found::get_404_not_found,
    recurring::{
        create_recurring_endpoint, delete_recurring_endpoint, get_edit_recurring_page,
        get_new_recurring_page, get_recurring_page, sync_recurring_endpoint,
        update_recurring_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
        get_new_transaction_page, get_transactions_page, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let view_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::RECURRING_VIEW, get(get_recurring_page))
        .route(endpoints::NEW_RECURRING_VIEW, get(get_new_recurring_page))
        .route(endpoints::EDIT_RECURRING_VIEW, get(get_edit_recurring_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_new_account_page))
        .route(endpoints::EDIT_ACCOUNT_VIEW, get(get_edit_account_page))
        .route(endpoints::CARDS_VIEW, get(get_cards_page))
        .route(endpoints::NEW_CARD_VIEW, get(get_new_card_page))
        .route(endpoints::EDIT_CARD_VIEW, get(get_edit_card_page))
        .route(endpoints::MEMBERS_VIEW, get(get_members_page))
        .route(endpoints::NEW_MEMBER_VIEW, get(get_new_member_page))
        .route(endpoints::EDIT_MEMBER_VIEW, get(get_edit_member_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::NEW_GOAL_VIEW, get(get_new_goal_page))
        .route(endpoints::EDIT_GOAL_VIEW, get(get_edit_goal_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(
            endpoints::POST_TRANSACTION,
            post(create_transaction_endpoint),
        )
        .route(endpoints::PUT_TRANSACTION, put(update_transaction_endpoint))
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(endpoints::SYNC_RECURRING, post(sync_recurring_endpoint))
        .route(endpoints::POST_RECURRING, post(create_recurring_endpoint))
        .route(endpoints::PUT_RECURRING, put(update_recurring_endpoint))
        .route(
            endpoints::DELETE_RECURRING,
            delete(delete_recurring_endpoint),
        )
        .route(endpoints::POST_ACCOUNT, post(create_account_endpoint))
        .route(endpoints::PUT_ACCOUNT, put(update_account_endpoint))
        .route(endpoints::DELETE_ACCOUNT, delete(delete_account_endpoint))
        .route(endpoints::POST_CARD, post(create_card_endpoint))
        .route(endpoints::PUT_CARD, put(update_card_endpoint))
        .route(endpoints::DELETE_CARD, delete(delete_card_endpoint))
        .route(endpoints::POST_MEMBER, post(create_member_endpoint))
        .route(endpoints::PUT_MEMBER, put(update_member_endpoint))
        .route(endpoints::DELETE_MEMBER, delete(delete_member_endpoint))
        .route(endpoints::POST_GOAL, post(create_goal_endpoint))
        .route(endpoints::PUT_GOAL, put(update_goal_endpoint))
        .route(endpoints::DELETE_GOAL, delete(delete_goal_endpoint))
        .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
        .route(endpoints::PUT_CATEGORY, put(update_category_endpoint))
        .route(
            endpoints::DELETE_CATEGORY,
            delete(delete_category_endpoint),
        );

    view_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
