//! Member editing page and endpoint.

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
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    member::{MemberId, MemberName, domain::MemberFormData, get_member, update_member},
    navigation::NavBar,
};

/// The state needed for the edit member page.
#[derive(Debug, Clone)]
pub struct EditMemberPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditMemberPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a member.
#[derive(Debug, Clone)]
pub struct UpdateMemberEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateMemberEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the member editing page.
pub async fn get_edit_member_page(
    Path(member_id): Path<MemberId>,
    State(state): State<EditMemberPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_MEMBER_VIEW, member_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_MEMBER, member_id);

    match get_member(member_id, &connection) {
        Ok(member) => {
            let form = MemberFormData {
                name: member.name.to_string(),
                role: member.role,
                avatar: member.avatar.unwrap_or_default(),
                monthly_income: member.monthly_income,
            };

            Ok(edit_member_view(&edit_endpoint, &update_endpoint, &form, "").into_response())
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Member not found",
                _ => {
                    tracing::error!("Failed to retrieve member {member_id}: {error}");
                    "Failed to load member"
                }
            };

            let form = MemberFormData {
                name: String::new(),
                role: String::new(),
                avatar: String::new(),
                monthly_income: None,
            };

            Ok(
                edit_member_view(&edit_endpoint, &update_endpoint, &form, error_message)
                    .into_response(),
            )
        }
    }
}

/// Handle member update form submission.
///
/// Updating a member that no longer exists is treated as a no-op and still
/// redirects to the members list.
pub async fn update_member_endpoint(
    Path(member_id): Path<MemberId>,
    State(state): State<UpdateMemberEndpointState>,
    Form(form_data): Form<MemberFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_MEMBER, member_id);

    let name = match MemberName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_member_form_view(&update_endpoint, &form_data, &format!("Error: {error}"))
                .into_response();
        }
    };

    if let Some(monthly_income) = form_data.monthly_income {
        if monthly_income < 0.0 {
            let error = Error::NegativeAmount(monthly_income);
            return edit_member_form_view(&update_endpoint, &form_data, &format!("Error: {error}"))
                .into_response();
        }
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let avatar = form_data.avatar.trim();
    let avatar = (!avatar.is_empty()).then_some(avatar);

    match update_member(
        member_id,
        name,
        form_data.role.trim(),
        avatar,
        form_data.monthly_income,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::MEMBERS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating member {member_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_member_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    form: &MemberFormData,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_member_form_view(update_endpoint, form, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Member", &[dollar_input_styles()], &content)
}

fn edit_member_form_view(
    update_member_endpoint: &str,
    form: &MemberFormData,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_member_endpoint)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Name"
                    value=(form.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="role"
                    class=(FORM_LABEL_STYLE)
                {
                    "Role"
                }

                input
                    id="role"
                    type="text"
                    name="role"
                    placeholder="Parent, Child, ..."
                    value=(form.role)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="avatar"
                    class=(FORM_LABEL_STYLE)
                {
                    "Avatar URL (optional)"
                }

                input
                    id="avatar"
                    type="text"
                    name="avatar"
                    placeholder="/static/avatars/alex.png"
                    value=(form.avatar)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="monthly_income"
                    class=(FORM_LABEL_STYLE)
                {
                    "Estimated Monthly Income (optional)"
                }

                div class="input-wrapper w-full"
                {
                    input
                        id="monthly_income"
                        type="number"
                        name="monthly_income"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        value=[form.monthly_income]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Member" }
        }
    }
}

#[cfg(test)]
mod edit_member_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        endpoints,
        member::{
            MemberName, create_member, create_member_table,
            domain::MemberFormData,
            edit::{EditMemberPageState, UpdateMemberEndpointState},
            get_edit_member_page, get_member, update_member_endpoint,
        },
        test_utils::{
            assert_content_type, assert_form_error_message, assert_form_input_with_value,
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    fn get_edit_member_state() -> EditMemberPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_member_table(&connection).expect("Could not create member table");

        EditMemberPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_update_member_state() -> UpdateMemberEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_member_table(&connection).expect("Could not create member table");

        UpdateMemberEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn get_edit_member_page_succeeds() {
        let state = get_edit_member_state();
        let member = create_member(
            MemberName::new_unchecked("Alex"),
            "Parent",
            None,
            Some(4200.0),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test member");

        let response = get_edit_member_page(Path(member.id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PUT_MEMBER, member.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Alex");
        assert_form_input_with_value(&form, "role", "text", "Parent");
        assert_form_submit_button_with_text(&form, "Update Member");
    }

    #[tokio::test]
    async fn get_edit_member_page_with_invalid_id_shows_error() {
        let state = get_edit_member_state();
        let invalid_id = 999999;

        let response = get_edit_member_page(Path(invalid_id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_form_error_message(&form, "Member not found");
    }

    #[tokio::test]
    async fn update_member_endpoint_succeeds() {
        let state = get_update_member_state();
        let member = create_member(
            MemberName::new_unchecked("Alex"),
            "Child",
            None,
            None,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test member");

        let form = MemberFormData {
            name: "Alexandra".to_string(),
            role: "Parent".to_string(),
            avatar: "".to_string(),
            monthly_income: Some(5000.0),
        };

        let response = update_member_endpoint(Path(member.id), State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::MEMBERS_VIEW);

        let updated_member = get_member(member.id, &state.db_connection.lock().unwrap())
            .expect("Could not get updated member");
        assert_eq!(updated_member.name.as_ref(), "Alexandra");
        assert_eq!(updated_member.monthly_income, Some(5000.0));
    }

    #[tokio::test]
    async fn update_member_endpoint_with_missing_id_is_a_no_op() {
        let state = get_update_member_state();
        let invalid_id = 999999;
        let form = MemberFormData {
            name: "Nobody".to_string(),
            role: "Ghost".to_string(),
            avatar: "".to_string(),
            monthly_income: None,
        };

        let response = update_member_endpoint(Path(invalid_id), State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::MEMBERS_VIEW);
    }

    #[tokio::test]
    async fn update_member_endpoint_with_empty_name_returns_error() {
        let state = get_update_member_state();
        let member = create_member(
            MemberName::new_unchecked("Alex"),
            "Parent",
            None,
            None,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test member");

        let form = MemberFormData {
            name: "".to_string(),
            role: "Parent".to_string(),
            avatar: "".to_string(),
            monthly_income: None,
        };

        let response = update_member_endpoint(Path(member.id), State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Member name cannot be empty");
    }
}
