//! Defines the endpoint for replacing the fields of a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    transaction::{
        core::update_transaction,
        form::{
            FormAction, FormOptions, TransactionForm, get_form_category, transaction_form,
            validate_transaction_form,
        },
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for editing a transaction, redirects to the dashboard on success.
///
/// Every field except the owner and creation time is replaced.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
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
            return match FormOptions::load(&form, &connection) {
                Ok(options) => transaction_form(
                    FormAction::Edit(transaction_id),
                    &form,
                    &options,
                    &errors,
                )
                .into_response(),
                Err(error) => error.into_alert_response(),
            };
        }
    };

    match update_transaction(transaction_id, user_id, new_transaction, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
