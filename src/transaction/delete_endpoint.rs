use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, auth::UserID, database_id::TransactionId, endpoints,
    transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, redirects to the dashboard on success.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => {
            tracing::info!("user {user_id} deleted transaction {transaction_id}");

            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rust_decimal::Decimal;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        endpoints,
        test_utils::assert_hx_redirect,
        transaction::{
            core::{create_transaction, get_user_transaction, get_user_transactions},
            test_utils::{create_test_user, new_transaction},
        },
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn deletes_only_the_requested_transaction() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("alice", &connection);
        let doomed = create_transaction(
            user.id,
            new_transaction("Food", "Lunch", Decimal::ONE, date!(2025 - 10 - 26), &connection),
            &connection,
        )
        .unwrap();
        let kept = create_transaction(
            user.id,
            new_transaction("Food", "Dinner", Decimal::TWO, date!(2025 - 10 - 26), &connection),
            &connection,
        )
        .unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_transaction_endpoint(State(state.clone()), Extension(user.id), Path(doomed.id))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_user_transaction(doomed.id, user.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_user_transactions(user.id, &connection).unwrap(),
            vec![kept]
        );
    }

    #[tokio::test]
    async fn cannot_delete_another_users_transaction() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let transaction = create_transaction(
            alice.id,
            new_transaction("Food", "Lunch", Decimal::ONE, date!(2025 - 10 - 26), &connection),
            &connection,
        )
        .unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(bob.id),
            Path(transaction.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(
            get_user_transaction(transaction.id, alice.id, &state.db_connection.lock().unwrap())
                .is_ok()
        );
    }
}
