//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}/edit',
//! use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page showing balances, charts and category breakdowns.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing all accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for creating a new account.
pub const NEW_ACCOUNT_VIEW: &str = "/accounts/new";
/// The page for editing an existing account.
pub const EDIT_ACCOUNT_VIEW: &str = "/accounts/{account_id}/edit";
/// The page for listing all credit cards.
pub const CARDS_VIEW: &str = "/cards";
/// The page for creating a new card.
pub const NEW_CARD_VIEW: &str = "/cards/new";
/// The page for editing an existing card.
pub const EDIT_CARD_VIEW: &str = "/cards/{card_id}/edit";
/// The page for listing all family members.
pub const MEMBERS_VIEW: &str = "/members";
/// The page for creating a new family member.
pub const NEW_MEMBER_VIEW: &str = "/members/new";
/// The page for editing an existing family member.
pub const EDIT_MEMBER_VIEW: &str = "/members/{member_id}/edit";
/// The page for listing all savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for creating a new goal.
pub const NEW_GOAL_VIEW: &str = "/goals/new";
/// The page for editing an existing goal.
pub const EDIT_GOAL_VIEW: &str = "/goals/{goal_id}/edit";
/// The page for listing all categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for listing all recurring transaction templates.
pub const RECURRING_VIEW: &str = "/recurring";
/// The page for creating a new recurring transaction template.
pub const NEW_RECURRING_VIEW: &str = "/recurring/new";
/// The page for editing an existing recurring transaction template.
pub const EDIT_RECURRING_VIEW: &str = "/recurring/{template_id}/edit";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to create a transaction.
pub const POST_TRANSACTION: &str = "/api/transaction";
/// The route to update a transaction.
pub const PUT_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create an account.
pub const POST_ACCOUNT: &str = "/api/account";
/// The route to update an account.
pub const PUT_ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to delete an account.
pub const DELETE_ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to create a card.
pub const POST_CARD: &str = "/api/card";
/// The route to update a card.
pub const PUT_CARD: &str = "/api/cards/{card_id}";
/// The route to delete a card.
pub const DELETE_CARD: &str = "/api/cards/{card_id}";
/// The route to create a family member.
pub const POST_MEMBER: &str = "/api/member";
/// The route to update a family member.
pub const PUT_MEMBER: &str = "/api/members/{member_id}";
/// The route to delete a family member.
pub const DELETE_MEMBER: &str = "/api/members/{member_id}";
/// The route to create a goal.
pub const POST_GOAL: &str = "/api/goal";
/// The route to update a goal.
pub const PUT_GOAL: &str = "/api/goals/{goal_id}";
/// The route to delete a goal.
pub const DELETE_GOAL: &str = "/api/goals/{goal_id}";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/category";
/// The route to update a category.
pub const PUT_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a recurring transaction template.
pub const POST_RECURRING: &str = "/api/recurring";
/// The route to update a recurring transaction template.
pub const PUT_RECURRING: &str = "/api/recurring/{template_id}";
/// The route to delete a recurring transaction template.
pub const DELETE_RECURRING: &str = "/api/recurring/{template_id}";
/// The route to materialize due occurrences of recurring templates.
pub const SYNC_RECURRING: &str = "/api/recurring/sync";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/members/{member_id}', '{member_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
