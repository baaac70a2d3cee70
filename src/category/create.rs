//! Category creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    category::{CategoryName, create_category, domain::CategoryFormData},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    transaction::TransactionKind,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    new_category_view().into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Form(new_category): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&new_category.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let icon = new_category.icon.trim();
    let icon = (!icon.is_empty()).then_some(icon);
    let color = new_category.color.trim();
    let color = (!color.is_empty()).then_some(color);

    match create_category(name, new_category.kind, icon, color, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DuplicateCategoryName) => (
            StatusCode::BAD_REQUEST,
            Alert::Error {
                message: "Duplicate Category".to_owned(),
                details: format!(
                    "The category \"{}\" already exists for {} transactions. \
                    Choose a different name, or edit or delete the existing category.",
                    new_category.name, new_category.kind
                ),
            }
            .into_html(),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn new_category_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Category", &[], &content)
}

pub(crate) fn category_kind_radio_group(selected: TransactionKind) -> Markup {
    html! {
        div class=(FORM_RADIO_GROUP_STYLE)
        {
            div class="flex items-center gap-2"
            {
                input
                    id="kind-expense"
                    type="radio"
                    name="kind"
                    value="expense"
                    checked[selected == TransactionKind::Expense]
                    class=(FORM_RADIO_INPUT_STYLE);

                label for="kind-expense" class=(FORM_RADIO_LABEL_STYLE) { "Expense" }
            }

            div class="flex items-center gap-2"
            {
                input
                    id="kind-income"
                    type="radio"
                    name="kind"
                    value="income"
                    checked[selected == TransactionKind::Income]
                    class=(FORM_RADIO_INPUT_STYLE);

                label for="kind-income" class=(FORM_RADIO_LABEL_STYLE) { "Income" }
            }
        }
    }
}

fn new_category_form_view(error_message: &str) -> Markup {
    let create_category_endpoint = endpoints::POST_CATEGORY;

    html! {
        form
            hx-post=(create_category_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label class=(FORM_LABEL_STYLE) { "Kind" }

                (category_kind_radio_group(TransactionKind::Expense))
            }

            div
            {
                label
                    for="icon"
                    class=(FORM_LABEL_STYLE)
                {
                    "Icon (optional)"
                }

                input
                    id="icon"
                    type="text"
                    name="icon"
                    placeholder="🛒"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="color"
                    class=(FORM_LABEL_STYLE)
                {
                    "Colour (optional)"
                }

                input
                    id="color"
                    type="text"
                    name="color"
                    placeholder="#16a34a"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}
