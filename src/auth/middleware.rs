//! The auth guards that keep logged-out visitors away from the app's pages and API.
//!
//! A request with a valid session cookie gets the user's [UserID] as an
//! extension, and its response carries the session cookie with a pushed-back
//! expiry. Any other request is sent to the log-in page, with a link back to
//! where the visitor was headed.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        UserID,
        cookie::{read_session, refresh_session},
        redirect::{log_in_url_returning_to, return_address},
    },
    endpoints,
    timezone::get_local_offset,
};

/// How long a session stays alive after the latest authorized request.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed to read and refresh session cookies.
#[derive(Clone)]
pub struct AuthState {
    pub cookie_key: Key,
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

fn log_in_url_for(request: &Request) -> String {
    let target = return_address(request).unwrap_or_else(|| {
        tracing::warn!(
            "no usable return address for {}, returning to the dashboard after log in",
            request.uri().path()
        );
        endpoints::DASHBOARD_VIEW.to_owned()
    });

    log_in_url_returning_to(&target).unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

/// Run `request` as the user in its session cookie.
///
/// Returns the log-in URL to send the visitor to when there is no valid session.
async fn authorize(state: &AuthState, request: Request, next: Next) -> Result<Response, String> {
    let log_in_url = log_in_url_for(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("invalid timezone {}", state.local_timezone);
        return Err(log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = PrivateCookieJar::<Key>::from_request_parts(&mut parts, state)
        .await
        .map_err(|error| {
            tracing::error!("could not read cookies: {error:?}");
            log_in_url.clone()
        })?;
    let user_id: UserID = read_session(&jar)
        .map_err(|_| log_in_url.clone())?
        .user_id;

    parts.extensions.insert(user_id);
    let mut response = next.run(Request::from_parts(parts, body)).await;

    let jar = refresh_session(jar.clone(), SESSION_EXTENSION, local_offset)
        .unwrap_or_else(|error| {
            tracing::error!("could not extend session of user {user_id}: {error}");
            jar
        });
    let cookie_headers = jar.into_response();
    for cookie in cookie_headers.headers().get_all(SET_COOKIE) {
        response.headers_mut().append(SET_COOKIE, cookie.clone());
    }

    Ok(response)
}

/// Guard for pages: visitors without a valid session are redirected to the log-in page.
///
/// Handlers behind the guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    authorize(&state, request, next)
        .await
        .unwrap_or_else(|log_in_url| Redirect::to(&log_in_url).into_response())
}

/// Guard for HTMX endpoints: like [auth_guard], but redirects with the `HX-Redirect` header.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    authorize(&state, request, next)
        .await
        .unwrap_or_else(|log_in_url| (HxRedirect(log_in_url), StatusCode::OK).into_response())
}
