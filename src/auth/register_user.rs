//! The registration page for creating an account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, PasswordHash, PersonalDetails, Username, ValidatedPassword,
        account::{DetailErrors, personal_details_inputs, validate_personal_details},
        create_user, set_auth_cookie, update_account,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_register, password_input, username_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

/// Error messages to show under the registration form fields.
#[derive(Default)]
struct RegistrationErrors<'a> {
    username: Option<&'a str>,
    details: DetailErrors,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(
    username: &str,
    details: &PersonalDetails,
    password: &str,
    errors: RegistrationErrors,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #first_name, #last_name, #email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (username_input(username, errors.username))
            (personal_details_inputs(details, &errors.details))
            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(
        "",
        &PersonalDetails::default(),
        "",
        RegistrationErrors::default(),
    );
    let content = log_in_register("Create Account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create an account, log the new user in and send them to the setup page.
///
/// Invalid input re-renders the form with a message under the offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let raw_username = user_data.username.as_str();
    let entered = PersonalDetails {
        first_name: user_data.first_name.clone(),
        last_name: user_data.last_name.clone(),
        email: user_data.email.clone(),
    };

    let username = match Username::new(raw_username) {
        Ok(username) => username,
        Err(error) => {
            let message = match error {
                Error::InvalidUsername(message) => message,
                error => error.to_string(),
            };

            return registration_form(
                raw_username,
                &entered,
                &user_data.password,
                RegistrationErrors {
                    username: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let details = match validate_personal_details(
        &user_data.first_name,
        &user_data.last_name,
        &user_data.email,
    ) {
        Ok(details) => details,
        Err(errors) => {
            return registration_form(
                username.as_str(),
                &entered,
                &user_data.password,
                RegistrationErrors {
                    details: errors,
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let user_inputs = [
        username.as_str(),
        details.first_name.as_str(),
        details.last_name.as_str(),
        details.email.as_str(),
    ];
    let validated_password = match ValidatedPassword::new(&user_data.password, &user_inputs) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(
                username.as_str(),
                &details,
                &user_data.password,
                RegistrationErrors {
                    password: Some(error.to_string().as_ref()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            username.as_str(),
            &details,
            &user_data.password,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        create_user(username.clone(), password_hash, &connection)
            .and_then(|user| update_account(user.id, &username, &details, &connection))
    };

    match user {
        Ok(user) => {
            tracing::info!("registered user {} with ID {}", user.username, user.id);

            match set_auth_cookie(jar, user.id, state.cookie_duration, local_timezone) {
                Ok(jar) => (
                    StatusCode::SEE_OTHER,
                    HxRedirect(endpoints::SETUP_VIEW.to_owned()),
                    jar,
                )
                    .into_response(),
                Err(e) => {
                    tracing::error!("An error occurred while setting the auth cookie: {e}");

                    get_internal_server_error_redirect()
                }
            }
        }
        Err(Error::DuplicateUsername(_)) => registration_form(
            username.as_str(),
            &details,
            &user_data.password,
            RegistrationErrors {
                username: Some("That username is already taken"),
                ..Default::default()
            },
        )
        .into_response(),
        Err(e) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {e}");

            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, body::Body, extract::State, http::Response};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;

    use crate::{
        auth::{
            COOKIE_TOKEN, PasswordHash, Username, count_users, create_user, get_user_by_username,
        },
        db::initialize,
        endpoints,
        test_utils::{assert_field_error, assert_hx_redirect, get_header, parse_html_fragment},
    };

    use super::{RegisterForm, RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "iamtestingwhethericanregisternewusers";

    fn get_state() -> RegistrationState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        RegistrationState::new("42", "Etc/UTC", Arc::new(Mutex::new(connection)))
    }

    fn form(username: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn post_form(state: RegistrationState, form: RegisterForm) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        register_user(State(state), jar, Form(form)).await
    }

    async fn assert_error_message(response: Response<Body>, input_id: &str, want: &str) {
        assert_field_error(&parse_html_fragment(response).await, input_id, want);
    }

    #[tokio::test]
    async fn register_user_succeeds() {
        let state = get_state();
        let db_connection = state.db_connection.clone();

        let response = post_form(state, form("alice", STRONG_PASSWORD, STRONG_PASSWORD)).await;

        assert_hx_redirect(&response, endpoints::SETUP_VIEW);
        assert!(get_header(&response, "set-cookie").starts_with(COOKIE_TOKEN));
        assert_eq!(count_users(&db_connection.lock().unwrap()), Ok(1));
    }

    #[tokio::test]
    async fn register_user_stores_personal_details() {
        let state = get_state();
        let db_connection = state.db_connection.clone();
        let form = RegisterForm {
            first_name: " Alice ".to_owned(),
            last_name: "Liddell".to_owned(),
            email: "alice@example.com".to_owned(),
            ..form("alice", STRONG_PASSWORD, STRONG_PASSWORD)
        };

        let response = post_form(state, form).await;

        assert_hx_redirect(&response, endpoints::SETUP_VIEW);
        let user = get_user_by_username("alice", &db_connection.lock().unwrap()).unwrap();
        assert_eq!(user.details.first_name, "Alice");
        assert_eq!(user.details.last_name, "Liddell");
        assert_eq!(user.details.email, "alice@example.com");
    }

    #[tokio::test]
    async fn register_user_fails_with_invalid_email() {
        let state = get_state();
        let db_connection = state.db_connection.clone();
        let form = RegisterForm {
            email: "alice".to_owned(),
            ..form("alice", STRONG_PASSWORD, STRONG_PASSWORD)
        };

        let response = post_form(state, form).await;

        assert_error_message(response, "email", "Enter an email address").await;
        assert_eq!(count_users(&db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_user_fails_with_invalid_username() {
        let response = post_form(
            get_state(),
            form("alice smith", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_error_message(response, "username", "cannot contain").await;
    }

    #[tokio::test]
    async fn register_user_fails_with_weak_password() {
        let response = post_form(get_state(), form("alice", "foo", "foo")).await;

        assert_error_message(response, "password", "password is too weak").await;
    }

    #[tokio::test]
    async fn register_user_fails_with_mismatched_passwords() {
        let response = post_form(
            get_state(),
            form("alice", STRONG_PASSWORD, "thisisadifferentpassword"),
        )
        .await;

        assert_error_message(response, "confirm-password", "Passwords do not match").await;
    }

    #[tokio::test]
    async fn register_user_fails_with_taken_username() {
        let state = get_state();
        create_user(
            Username::new("alice").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = post_form(state, form("alice", STRONG_PASSWORD, STRONG_PASSWORD)).await;

        assert_error_message(response, "username", "already taken").await;
    }
}
