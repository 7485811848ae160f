//! The page for changing the preferred currency.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    profile::{
        Currency, CurrencyId, get_currencies, get_profile,
        setup_page::{MISSING_CURRENCY_ERROR_MSG, ProfileForm, currency_select},
        update_profile_currency,
    },
};

fn preferences_form(
    currencies: &[Currency],
    selected: Option<CurrencyId>,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-put=(endpoints::PROFILE_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#currency_id, #submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Preferences" }

            (currency_select(currencies, selected, error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Save"
            }
        }
    }
}

/// The state needed for the preferences page.
#[derive(Debug, Clone)]
pub struct PreferencesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PreferencesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the preferences page with the user's current currency selected.
pub async fn get_preferences_page(
    State(state): State<PreferencesState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (currencies, profile) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_currencies(&connection)?,
            get_profile(user_id, &connection)?,
        )
    };

    let selected = profile.map(|profile| profile.currency.id);
    let content = html! {
        (NavBar::new(endpoints::PREFERENCES_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            (preferences_form(&currencies, selected, None))
        }
    };

    Ok(base("Preferences", &[], &content).into_response())
}

/// Change the currency of the logged-in user.
///
/// Responds with the form and a success alert.
pub async fn update_profile_endpoint(
    State(state): State<PreferencesState>,
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

    let currencies = match get_currencies(&connection) {
        Ok(currencies) => currencies,
        Err(error) => return error.into_alert_response(),
    };

    let Some(currency_id) = form.currency_id else {
        return preferences_form(&currencies, None, Some(MISSING_CURRENCY_ERROR_MSG))
            .into_response();
    };

    match update_profile_currency(user_id, currency_id, &connection) {
        Ok(profile) => {
            tracing::info!(
                "user {user_id} changed currency to {}",
                profile.currency.abbreviation
            );

            let alert = Alert::SuccessSimple {
                message: "Preferences saved".to_owned(),
            };

            html! {
                (preferences_form(&currencies, Some(profile.currency.id), None))

                div hx-swap-oob="innerHTML:#alert-container"
                {
                    (alert.into_html())
                }
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("could not update profile of user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
