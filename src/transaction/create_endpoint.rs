//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    transaction::{
        core::create_transaction,
        form::{
            FormAction, FormOptions, TransactionForm, get_form_category, transaction_form,
            validate_transaction_form,
        },
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction, redirects to the dashboard on success.
///
/// Invalid input is sent back as the form with a message under each bad field.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let category = match get_form_category(&form, &connection) {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };

    let new_transaction = match validate_transaction_form(&form, category.as_ref()) {
        Ok(new_transaction) => new_transaction,
        Err(errors) => {
            tracing::debug!("rejected transaction from user {user_id}: {errors:?}");

            return match FormOptions::load(&form, &connection) {
                Ok(options) => {
                    transaction_form(FormAction::Create, &form, &options, &errors).into_response()
                }
                Err(error) => error.into_alert_response(),
            };
        }
    };

    match create_transaction(user_id, new_transaction, &connection) {
        Ok(transaction) => {
            tracing::info!("user {user_id} created transaction {}", transaction.id);

            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}
