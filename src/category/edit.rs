//! Category edit page and update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        CategoryId, CategoryName,
        create::category_kind_radio_group,
        db::{get_category, update_category},
        domain::CategoryFormData,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    transaction::TransactionKind,
};

/// The state needed for rendering the category edit page.
#[derive(Debug, Clone)]
pub struct EditCategoryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page for editing an existing category.
pub async fn get_edit_category_page(
    State(state): State<EditCategoryPageState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let (form, error_message) = match get_category(category_id, &connection) {
        Ok(category) => (
            CategoryFormData {
                name: category.name.to_string(),
                kind: category.kind,
                icon: category.icon.unwrap_or_default(),
                color: category.color.unwrap_or_default(),
            },
            String::new(),
        ),
        Err(Error::NotFound) => (
            CategoryFormData {
                name: String::new(),
                kind: TransactionKind::Expense,
                icon: String::new(),
                color: String::new(),
            },
            "Category not found".to_string(),
        ),
        Err(error) => {
            tracing::error!("An unexpected error occurred while fetching a category: {error}");

            (
                CategoryFormData {
                    name: String::new(),
                    kind: TransactionKind::Expense,
                    icon: String::new(),
                    color: String::new(),
                },
                "Failed to load category".to_string(),
            )
        }
    };

    Ok(edit_category_view(category_id, &form, &error_message).into_response())
}

/// The state needed for updating a category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle the form submission for updating a category.
pub async fn update_category_endpoint(
    State(state): State<UpdateCategoryEndpointState>,
    Path(category_id): Path<CategoryId>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_category_form_view(category_id, &form_data, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let icon = form_data.icon.trim();
    let icon = (!icon.is_empty()).then_some(icon);
    let color = form_data.color.trim();
    let color = (!color.is_empty()).then_some(color);

    match update_category(category_id, name, form_data.kind, icon, color, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateCategoryName) => {
            edit_category_form_view(category_id, &form_data, &format!("Error: {error}"))
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_category_view(category_id: CategoryId, form: &CategoryFormData, error: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let form = edit_category_form_view(category_id, form, error);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Category", &[], &content)
}

fn edit_category_form_view(
    category_id: CategoryId,
    form: &CategoryFormData,
    error_message: &str,
) -> Markup {
    let update_category_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    html! {
        form
            hx-put=(update_category_endpoint)
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
                    value=(form.name)
                    placeholder="Category Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label class=(FORM_LABEL_STYLE) { "Kind" }

                (category_kind_radio_group(form.kind))
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
                    value=(form.icon)
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
                    value=(form.color)
                    placeholder="#16a34a"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }
        }
    }
}

#[cfg(test)]
mod edit_category_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use rusqlite::Connection;

    use crate::{
        category::{
            CategoryName, create_category, create_category_table, edit::EditCategoryPageState,
            get_edit_category_page,
        },
        test_utils::{
            assert_form_input_with_value, assert_valid_html, must_get_form, parse_html_document,
        },
        transaction::TransactionKind,
    };

    fn get_edit_page_state() -> EditCategoryPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");

        EditCategoryPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn render_page_with_existing_category() {
        let state = get_edit_page_state();
        create_category(
            CategoryName::new_unchecked("Groceries"),
            TransactionKind::Expense,
            Some("🛒"),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test category");

        let response = get_edit_category_page(State(state), Path(1))
            .await
            .expect("Could not get edit category page");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "Groceries");
        assert_form_input_with_value(&form, "icon", "text", "🛒");
    }

    #[tokio::test]
    async fn render_page_with_invalid_id_shows_error() {
        let state = get_edit_page_state();

        let response = get_edit_category_page(State(state), Path(999))
            .await
            .expect("Could not get edit category page");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Category not found"),
            "page should report the missing category, got: {text}"
        );
    }
}
