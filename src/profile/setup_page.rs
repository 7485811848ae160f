//! The first-run page where a new user picks their currency.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
// axum_extra's Form parses an empty select value as None.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_register,
    },
    profile::{Currency, CurrencyId, create_profile, get_currencies, get_profile},
};

pub(super) const MISSING_CURRENCY_ERROR_MSG: &str = "Choose a currency";

/// A `<select>` of every currency with `selected` chosen.
pub(super) fn currency_select(
    currencies: &[Currency],
    selected: Option<CurrencyId>,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label
                for="currency_id"
                class=(FORM_LABEL_STYLE)
            {
                "Currency"
            }

            select
                name="currency_id"
                id="currency_id"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select currency..." }

                @for currency in currencies {
                    option value=(currency.id) selected[Some(currency.id) == selected] {
                        (currency.display())
                    }
                }
            }

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn setup_form(currencies: &[Currency], error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::PROFILE_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#currency_id, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Pick the currency your entries are recorded in. "
                "You can change it later in your preferences."
            }

            (currency_select(currencies, None, error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Get Started"
            }
        }
    }
}

/// The state needed for the setup page and for creating a profile.
#[derive(Debug, Clone)]
pub struct SetupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the setup page, or send users who already have a profile to the dashboard.
pub async fn get_setup_page(
    State(state): State<SetupState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    if get_profile(user_id, &connection)?.is_some() {
        return Ok(Redirect::to(endpoints::DASHBOARD_VIEW).into_response());
    }

    let currencies = get_currencies(&connection)?;
    let content = log_in_register("Welcome to Wallet", &setup_form(&currencies, None));

    Ok(base("Setup", &[], &content).into_response())
}

/// The form data for choosing a currency.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub currency_id: Option<CurrencyId>,
}

/// Create the profile of the logged-in user and send them to the dashboard.
pub async fn create_profile_endpoint(
    State(state): State<SetupState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let Some(currency_id) = form.currency_id else {
        return match get_currencies(&connection) {
            Ok(currencies) => {
                setup_form(&currencies, Some(MISSING_CURRENCY_ERROR_MSG)).into_response()
            }
            Err(error) => error.into_alert_response(),
        };
    };

    match get_profile(user_id, &connection) {
        Ok(Some(_)) => {
            tracing::warn!("user {user_id} tried to create a second profile");
        }
        Ok(None) => {
            if let Err(error) = create_profile(user_id, currency_id, &connection) {
                tracing::error!("could not create profile for user {user_id}: {error}");
                return error.into_alert_response();
            }

            tracing::info!("created profile for user {user_id}");
        }
        Err(error) => return error.into_alert_response(),
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserID, Username, create_user},
        db::initialize,
        endpoints,
        profile::{create_profile, get_profile},
        test_utils::{
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, get_header, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        MISSING_CURRENCY_ERROR_MSG, ProfileForm, SetupState, create_profile_endpoint,
        get_setup_page,
    };

    fn get_test_state() -> (SetupState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Username::new_unchecked("alice"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            SetupState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn renders_currency_form() {
        let (state, user_id) = get_test_state();

        let response = get_setup_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-post");
        let options = form
            .select(&scraper::Selector::parse("select[name=currency_id] option").unwrap())
            .count();
        assert_eq!(options, 9, "want placeholder plus 8 currencies");
    }

    #[tokio::test]
    async fn setup_page_redirects_user_with_profile() {
        let (state, user_id) = get_test_state();
        create_profile(user_id, 1, &state.db_connection.lock().unwrap()).unwrap();

        let response = get_setup_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn creates_profile_and_redirects_to_dashboard() {
        let (state, user_id) = get_test_state();

        let response = create_profile_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(ProfileForm {
                currency_id: Some(2),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let profile = get_profile(user_id, &state.db_connection.lock().unwrap())
            .unwrap()
            .expect("profile should have been created");
        assert_eq!(profile.currency.id, 2);
    }

    #[tokio::test]
    async fn missing_currency_shows_error() {
        let (state, user_id) = get_test_state();

        let response = create_profile_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(ProfileForm { currency_id: None }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        let error = form
            .select(&scraper::Selector::parse("p.text-red-500").unwrap())
            .next()
            .expect("no error message")
            .text()
            .collect::<String>();
        assert_eq!(error, MISSING_CURRENCY_ERROR_MSG);
        assert_eq!(
            get_profile(user_id, &state.db_connection.lock().unwrap()),
            Ok(None)
        );
    }
}
