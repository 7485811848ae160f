//! The page that asks the user to confirm deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base,
        format_currency, format_date_input, loading_spinner,
    },
    navigation::NavBar,
    profile::get_profile,
    transaction::{Transaction, core::get_user_transaction},
};

fn delete_confirmation(transaction: &Transaction, symbol: &str) -> Markup {
    let delete_endpoint = format_endpoint(endpoints::TRANSACTION, transaction.id);

    html! {
        form
            hx-delete=(delete_endpoint)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Delete Entry" }

            p
            {
                "Are you sure you want to delete "
                strong { (transaction.name) }
                " (" (format_currency(transaction.amount, symbol)) " on "
                (format_date_input(transaction.date)) ")? This cannot be undone."
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator"
                {
                    (loading_spinner())
                }
                " Delete"
            }

            a href=(endpoints::DASHBOARD_VIEW) class={"block text-center " (BUTTON_SECONDARY_STYLE)}
            {
                "Cancel"
            }
        }
    }
}

/// The state needed for the delete confirmation page.
#[derive(Debug, Clone)]
pub struct DeleteTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the confirmation for deleting a transaction owned by the user.
pub async fn get_delete_transaction_page(
    State(state): State<DeleteTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let (transaction, symbol) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = get_user_transaction(transaction_id, user_id, &connection)?;
        let symbol = get_profile(user_id, &connection)?
            .map(|profile| profile.currency.symbol)
            .unwrap_or_default();

        (transaction, symbol)
    };

    let content = html! {
        (NavBar::new(endpoints::DELETE_TRANSACTION_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            (delete_confirmation(&transaction, &symbol))
        }
    };

    Ok(base("Delete Entry", &[], &content).into_response())
}
