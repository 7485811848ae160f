//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    alert::Alert, html::error_view, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The username is empty, too long or contains characters other than
    /// letters, digits and `@.+-_`.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// A type, category, currency or user ID did not refer to an existing row.
    #[error("a referenced type, category, currency or user does not exist")]
    InvalidReference,

    /// The date range filter could not be parsed.
    ///
    /// Holds the raw string sent by the client.
    #[error("invalid date range \"{0}\"")]
    InvalidDateRange(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
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

/// What to tell the user about an error they can do something about.
struct Explanation {
    status: StatusCode,
    title: &'static str,
    details: String,
}

impl Error {
    fn explain(&self) -> Option<Explanation> {
        let (status, title, details) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid timezone settings",
                format!(
                    "\"{timezone}\" is not a canonical timezone name. \
                    Restart the server with a name like \"Pacific/Auckland\"."
                ),
            ),
            Error::InvalidReference => (
                StatusCode::BAD_REQUEST,
                "Invalid selection",
                "One of the selected options no longer exists. Refresh the page and try again."
                    .to_owned(),
            ),
            Error::InvalidDateRange(date_range) => (
                StatusCode::BAD_REQUEST,
                "Invalid date range",
                format!(
                    "Could not read the date range \"{date_range}\". \
                    Use the format MM/DD/YYYY - MM/DD/YYYY."
                ),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "Not found",
                "The requested item could not be found.".to_owned(),
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Could not update transaction",
                "The transaction could not be found.".to_owned(),
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Could not delete transaction",
                "The transaction could not be found. \
                It may have been deleted already, try refreshing the page."
                    .to_owned(),
            ),
            _ => return None,
        };

        Some(Explanation {
            status,
            title,
            details,
        })
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status, alert) = match self.explain() {
            Some(Explanation {
                status,
                title,
                details,
            }) => (
                status,
                Alert::Error {
                    message: title.to_owned(),
                    details,
                },
            ),
            None => {
                tracing::error!("An unexpected error occurred: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details: "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                    },
                )
            }
        };

        (status, alert.into_html()).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if matches!(self, Error::NotFound) {
            return NotFoundError.into_response();
        }

        let Some(Explanation {
            status,
            title,
            details,
        }) = self.explain()
        else {
            tracing::error!("An unexpected error occurred: {self}");
            return InternalServerError::default().into_response();
        };

        if status.is_server_error() {
            return InternalServerError {
                description: title,
                fix: &details,
            }
            .into_response();
        }

        tracing::warn!("{self}");
        let page = error_view(
            status.canonical_reason().unwrap_or("Error"),
            status.as_str(),
            title,
            &details,
        );

        (status, Html(page.into_string())).into_response()
    }
}
