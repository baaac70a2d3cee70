//! FamLedger is a web app for tracking your family's income, expenses, and
//! savings goals.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod card;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod forms;
mod goal;
mod html;
mod internal_server_error;
mod logging;
mod member;
mod navigation;
mod not_found;
mod pagination;
mod recurring;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response, recurring::Frequency,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a member name.
    #[error("Member name cannot be empty")]
    EmptyMemberName,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create an account name.
    #[error("Account name cannot be empty")]
    EmptyAccountName,

    /// An empty string was used to create a card name.
    #[error("Card name cannot be empty")]
    EmptyCardName,

    /// An empty string was used to create a goal name.
    #[error("Goal name cannot be empty")]
    EmptyGoalName,

    /// A negative amount was used to create a transaction.
    ///
    /// Amounts record magnitudes. Whether an amount adds to or subtracts from
    /// the balance comes from the transaction kind, so negative amounts are
    /// not allowed.
    #[error("amounts must be zero or greater, got {0}")]
    NegativeAmount(f64),

    /// A transaction referenced both an account and a card.
    ///
    /// A transaction is paid from at most one funding source.
    #[error("a transaction cannot be paid from both an account and a card")]
    ConflictingFundingSources,

    /// The current installment exceeded the total, or either was zero.
    #[error("installment {current} of {total} is not a valid combination")]
    InvalidInstallments {
        /// The index of the installment, starting from one.
        current: u32,
        /// How many installments the purchase is split across.
        total: u32,
    },

    /// A day outside the range 1-31 was used for a card closing or due day,
    /// or for a monthly schedule.
    #[error("{0} is not a valid day of the month")]
    InvalidDayOfMonth(u8),

    /// The card number was not exactly four ASCII digits.
    ///
    /// Only the last four digits of a card are ever stored.
    #[error("card numbers must end in exactly four digits")]
    InvalidCardNumber,

    /// The named category exists but tracks the opposite kind of transaction.
    #[error("the category \"{0}\" tracks the opposite kind of transaction")]
    CategoryKindMismatch(String),

    /// A recurring schedule was missing the day it anchors to, e.g. a monthly
    /// schedule with no day of the month.
    #[error("a {0} schedule needs an anchor day")]
    MissingScheduleAnchor(Frequency),

    /// A recurring schedule had an end date on or before its start date.
    #[error("the end date must be after the start date")]
    InvalidScheduleBounds,

    /// The specified account name already exists in the database.
    #[error("the account name already exists in the database")]
    DuplicateAccountName,

    /// The specified category name already exists under the same kind.
    #[error("the category already exists in the database")]
    DuplicateCategoryName,

    /// A query was given an ID that does not refer to an existing row.
    #[error("the selected item does not exist in the database")]
    InvalidReference,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidReference
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezone(timezone) => {
                let fix = format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                );

                InternalServerError {
                    description: "Invalid Timezone Settings",
                    fix: &fix,
                }
                .into_response()
            }
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for responses to htmx requests.
    fn into_alert_response(self) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The item could not be found. Try refreshing the page to see if it \
                        has already been deleted."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::InvalidTimezone(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings \
                        and ensure the timezone has been set to a valid, canonical timezone string"
                    ),
                }
                .into_html(),
            )
                .into_response(),
            error @ (Error::EmptyMemberName
            | Error::EmptyCategoryName
            | Error::EmptyAccountName
            | Error::EmptyCardName
            | Error::EmptyGoalName
            | Error::NegativeAmount(_)
            | Error::ConflictingFundingSources
            | Error::InvalidInstallments { .. }
            | Error::InvalidDayOfMonth(_)
            | Error::InvalidCardNumber
            | Error::CategoryKindMismatch(_)
            | Error::MissingScheduleAnchor(_)
            | Error::InvalidScheduleBounds
            | Error::DuplicateAccountName
            | Error::DuplicateCategoryName
            | Error::InvalidReference) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: error.to_string(),
                }
                .into_html(),
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more \
                        details."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
        }
    }
}
