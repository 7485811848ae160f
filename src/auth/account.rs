//! The account page where a user edits their username, name and email.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{
        UserID, Username,
        user::{PersonalDetails, get_user_by_id, update_account},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, loading_spinner, username_input,
    },
    navigation::NavBar,
};

/// The maximum number of characters in a first or last name.
pub const MAX_PERSON_NAME_LENGTH: usize = 150;
/// The maximum number of characters in an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;

const NAME_TOO_LONG_MSG: &str = "Names can be at most 150 characters long";
const EMAIL_INVALID_MSG: &str = "Enter an email address like jane@example.com";
const USERNAME_TAKEN_MSG: &str = "That username is already taken";

/// Messages to show under the personal detail inputs.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct DetailErrors {
    pub first_name: Option<&'static str>,
    pub last_name: Option<&'static str>,
    pub email: Option<&'static str>,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
        && !email.chars().any(char::is_whitespace)
}

/// Trim the names and email, and check their lengths and the email's shape.
///
/// Every field may be left empty.
pub(crate) fn validate_personal_details(
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<PersonalDetails, DetailErrors> {
    let details = PersonalDetails {
        first_name: first_name.trim().to_owned(),
        last_name: last_name.trim().to_owned(),
        email: email.trim().to_owned(),
    };
    let too_long = |name: &str| {
        (name.chars().count() > MAX_PERSON_NAME_LENGTH).then_some(NAME_TOO_LONG_MSG)
    };

    let errors = DetailErrors {
        first_name: too_long(&details.first_name),
        last_name: too_long(&details.last_name),
        email: (!details.email.is_empty()
            && (details.email.chars().count() > MAX_EMAIL_LENGTH
                || !is_valid_email(&details.email)))
        .then_some(EMAIL_INVALID_MSG),
    };

    if errors == DetailErrors::default() {
        Ok(details)
    } else {
        Err(errors)
    }
}

fn optional_text_input(
    name: &str,
    label: &str,
    type_: &str,
    placeholder: &str,
    value: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(type_)
                name=(name)
                id=(name)
                placeholder=(placeholder)
                class=(FORM_TEXT_INPUT_STYLE)
                value=(value);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// The first name, last name and email inputs shared by registration and the account page.
pub(crate) fn personal_details_inputs(details: &PersonalDetails, errors: &DetailErrors) -> Markup {
    html! {
        (optional_text_input("first_name", "First Name", "text", "Jane", &details.first_name, errors.first_name))
        (optional_text_input("last_name", "Last Name", "text", "Doe", &details.last_name, errors.last_name))
        (optional_text_input("email", "Email", "email", "jane@example.com", &details.email, errors.email))
    }
}

fn account_form(
    username: &str,
    details: &PersonalDetails,
    username_error: Option<&str>,
    errors: &DetailErrors,
) -> Markup {
    html! {
        form
            hx-put=(endpoints::ACCOUNT_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #first_name, #last_name, #email, #submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Account" }

            (username_input(username, username_error))
            (personal_details_inputs(details, errors))

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

/// The state needed for the account page.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating an account.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AccountForm {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Display the account page filled in with the user's current details.
pub async fn get_account_page(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection)?
    };

    let content = html! {
        (NavBar::new(endpoints::ACCOUNT_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            (account_form(user.username.as_str(), &user.details, None, &DetailErrors::default()))
        }
    };

    Ok(base("Account", &[], &content).into_response())
}

/// Change the username and personal details of the logged-in user.
///
/// Invalid input re-renders the form with messages, success adds an alert.
pub async fn update_account_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AccountForm>,
) -> Response {
    let entered = PersonalDetails {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
    };

    let username = match Username::new(&form.username) {
        Ok(username) => username,
        Err(error) => {
            let message = match error {
                Error::InvalidUsername(message) => message,
                error => error.to_string(),
            };

            return account_form(
                &form.username,
                &entered,
                Some(&message),
                &DetailErrors::default(),
            )
            .into_response();
        }
    };

    let details = match validate_personal_details(&form.first_name, &form.last_name, &form.email)
    {
        Ok(details) => details,
        Err(errors) => {
            return account_form(username.as_str(), &entered, None, &errors).into_response();
        }
    };

    let result = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        update_account(user_id, &username, &details, &connection)
    };

    match result {
        Ok(user) => {
            tracing::info!("user {user_id} updated their account");

            let alert = Alert::SuccessSimple {
                message: "Account saved".to_owned(),
            };

            html! {
                (account_form(user.username.as_str(), &user.details, None, &DetailErrors::default()))

                div hx-swap-oob="innerHTML:#alert-container"
                {
                    (alert.into_html())
                }
            }
            .into_response()
        }
        Err(Error::DuplicateUsername(_)) => account_form(
            username.as_str(),
            &details,
            Some(USERNAME_TAKEN_MSG),
            &DetailErrors::default(),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not update account of user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod validation_tests {
    use super::{
        DetailErrors, EMAIL_INVALID_MSG, MAX_PERSON_NAME_LENGTH, NAME_TOO_LONG_MSG,
        validate_personal_details,
    };

    #[test]
    fn empty_details_are_allowed() {
        let details = validate_personal_details(" ", "", "").unwrap();

        assert_eq!(details.first_name, "");
        assert_eq!(details.email, "");
    }

    #[test]
    fn trims_details() {
        let details = validate_personal_details(" Jane ", "Doe ", " jane@example.com").unwrap();

        assert_eq!(details.first_name, "Jane");
        assert_eq!(details.last_name, "Doe");
        assert_eq!(details.email, "jane@example.com");
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in [
            "jane",
            "@example.com",
            "jane@",
            "jane@example",
            "jane@example..com",
            "jane@@example.com",
            "jane doe@example.com",
        ] {
            assert_eq!(
                validate_personal_details("", "", email),
                Err(DetailErrors {
                    email: Some(EMAIL_INVALID_MSG),
                    ..Default::default()
                }),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_long_names() {
        let long_name = "a".repeat(MAX_PERSON_NAME_LENGTH + 1);

        let errors = validate_personal_details(&long_name, &long_name, "").unwrap_err();

        assert_eq!(errors.first_name, Some(NAME_TOO_LONG_MSG));
        assert_eq!(errors.last_name, Some(NAME_TOO_LONG_MSG));
    }
}

#[cfg(test)]
mod endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        auth::{PasswordHash, UserID, Username, create_user, get_user_by_id},
        db::initialize,
        endpoints,
        test_utils::{
            assert_field_error, assert_form_input_with_value, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        AccountForm, AccountState, EMAIL_INVALID_MSG, USERNAME_TAKEN_MSG, get_account_page,
        update_account_endpoint,
    };

    fn get_test_state() -> (AccountState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Username::new_unchecked("alice"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            AccountState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn form(username: &str, email: &str) -> AccountForm {
        AccountForm {
            username: username.to_owned(),
            first_name: "Alice".to_owned(),
            last_name: "Liddell".to_owned(),
            email: email.to_owned(),
        }
    }

    #[tokio::test]
    async fn page_shows_current_username() {
        let (state, user_id) = get_test_state();

        let response = get_account_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::ACCOUNT_API, "hx-put");
        assert_form_input_with_value(&form, "username", "text", "alice");
    }

    #[tokio::test]
    async fn update_saves_details_and_shows_alert() {
        let (state, user_id) = get_test_state();

        let response = update_account_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("alice.l", "alice@example.com")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let alert = html
            .select(&Selector::parse("[role=alert]").unwrap())
            .next()
            .expect("no alert found");
        assert!(alert.text().collect::<String>().contains("Account saved"));
        let user = get_user_by_id(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(user.username.as_str(), "alice.l");
        assert_eq!(user.details.first_name, "Alice");
        assert_eq!(user.details.email, "alice@example.com");
    }

    #[tokio::test]
    async fn invalid_email_is_not_saved() {
        let (state, user_id) = get_test_state();

        let response = update_account_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("alice", "not-an-email")),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_field_error(&html, "email", EMAIL_INVALID_MSG);
        let user = get_user_by_id(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(user.details.email, "");
    }

    #[tokio::test]
    async fn taken_username_is_reported() {
        let (state, user_id) = get_test_state();
        create_user(
            Username::new_unchecked("bob"),
            PasswordHash::new_unchecked("hunter2"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = update_account_endpoint(
            State(state),
            Extension(user_id),
            Form(form("bob", "")),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_field_error(&html, "username", USERNAME_TAKEN_MSG);
    }
}
