//! Defines the route handler for the page for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, currency_input_styles},
    navigation::NavBar,
    profile::get_profile,
    transaction::{
        core::get_user_transaction,
        form::{FieldErrors, FormAction, FormOptions, TransactionForm, transaction_form},
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for accessing the transaction and its choices.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction, pre-filled with its current values.
///
/// Responds with the 404 page if the transaction does not exist or belongs to
/// another user.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let (values, options, symbol) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = get_user_transaction(transaction_id, user_id, &connection)
            .inspect_err(|error| {
                tracing::warn!(
                    "user {user_id} could not open transaction {transaction_id} for editing: {error}"
                )
            })?;
        let values = TransactionForm::from(&transaction);
        let options = FormOptions::load(&values, &connection)?;
        let symbol = get_profile(user_id, &connection)?
            .map(|profile| profile.currency.symbol)
            .unwrap_or_default();

        (values, options, symbol)
    };

    let content = html! {
        (NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            (transaction_form(
                FormAction::Edit(transaction_id),
                &values,
                &options,
                &FieldErrors::default()
            ))
        }
    };

    Ok(base("Edit Entry", &[currency_input_styles(&symbol)], &content).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rust_decimal::Decimal;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
        transaction::{
            core::create_transaction,
            test_utils::{create_test_user, new_transaction},
        },
    };

    use super::{EditTransactionPageState, get_edit_transaction_page};

    #[tokio::test]
    async fn renders_form_with_transaction_values() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("alice", &connection);
        let transaction = create_transaction(
            user.id,
            new_transaction(
                "Transport",
                "Bus pass",
                Decimal::new(4550, 2),
                date!(2025 - 02 - 01),
                &connection,
            ),
            &connection,
        )
        .unwrap();
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            get_edit_transaction_page(State(state), Extension(user.id), Path(transaction.id))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Bus pass");
        assert_form_input_with_value(&form, "amount", "number", "45.50");
        assert_form_input_with_value(&form, "date", "text", "02/01/2025");
        let selected_category = form
            .select(&Selector::parse("select[name=category_id] option[selected]").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(selected_category, vec!["🚌 Transport"]);
    }

    #[tokio::test]
    async fn other_users_transaction_is_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let transaction = create_transaction(
            alice.id,
            new_transaction(
                "Food",
                "Lunch",
                Decimal::new(1200, 2),
                date!(2025 - 02 - 01),
                &connection,
            ),
            &connection,
        )
        .unwrap();
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            get_edit_transaction_page(State(state), Extension(bob.id), Path(transaction.id))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
