//! Middleware that sends users who have not chosen a currency to the setup page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{AppState, Error, auth::UserID, endpoints, profile::get_profile};

/// The state needed for the setup guard.
#[derive(Debug, Clone)]
pub struct SetupGuardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetupGuardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

async fn setup_guard_internal(
    state: SetupGuardState,
    user_id: UserID,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let profile = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        get_profile(user_id, &connection)
    };

    match profile {
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => {
            tracing::debug!("user {user_id} has no profile, redirecting to setup");
            get_redirect(endpoints::SETUP_VIEW)
        }
        Err(error) => {
            tracing::error!("could not get profile for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// Middleware that redirects users without a profile to the setup page.
///
/// Must run after [crate::auth::auth_guard] so that the user ID is in the request extensions.
pub async fn setup_guard(
    State(state): State<SetupGuardState>,
    Extension(user_id): Extension<UserID>,
    request: Request,
    next: Next,
) -> Response {
    setup_guard_internal(state, user_id, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware that redirects users without a profile to the setup page with an HTMX redirect.
///
/// Must run after [crate::auth::auth_guard_hx] so that the user ID is in the request extensions.
pub async fn setup_guard_hx(
    State(state): State<SetupGuardState>,
    Extension(user_id): Extension<UserID>,
    request: Request,
    next: Next,
) -> Response {
    setup_guard_internal(state, user_id, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
