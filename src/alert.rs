//! Alert fragments for reporting endpoint outcomes to the client.
//!
//! Alerts are rendered as an out-of-band swap targeting the alert container
//! that [crate::html::base] places on every page, so any htmx response can
//! surface a message without replacing the content the request targeted.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A message shown in the floating alert container at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with supporting details.
    Success { message: String, details: String },
    /// A success message with no details line.
    SuccessSimple { message: String },
    /// An error message with supporting details.
    Error { message: String, details: String },
}

const SUCCESS_BOX_STYLE: &str = "flex items-start gap-3 w-full p-4 rounded-lg \
    border border-green-300 bg-green-50 text-green-800 shadow-lg \
    dark:border-green-800 dark:bg-gray-800 dark:text-green-400";

const ERROR_BOX_STYLE: &str = "flex items-start gap-3 w-full p-4 rounded-lg \
    border border-red-300 bg-red-50 text-red-800 shadow-lg \
    dark:border-red-800 dark:bg-gray-800 dark:text-red-400";

impl Alert {
    /// Render the alert as a fragment that swaps itself into the alert
    /// container out-of-band.
    pub fn into_html(self) -> Markup {
        let (box_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_BOX_STYLE, message, Some(details)),
            Alert::SuccessSimple { message } => (SUCCESS_BOX_STYLE, message, None),
            Alert::Error { message, details } => (ERROR_BOX_STYLE, message, Some(details)),
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(box_style) role="alert"
                {
                    div class="flex-1 text-sm"
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="shrink-0 font-semibold opacity-70 hover:opacity-100"
                        aria-label="Dismiss"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "✕"
                    }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status = match &self {
            Alert::Success { .. } | Alert::SuccessSimple { .. } => StatusCode::OK,
            Alert::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.into_html()).into_response()
    }
}
