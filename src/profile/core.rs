//! The per-user settings row that records the preferred currency.

use rusqlite::{Connection, OptionalExtension};

use crate::{
    Error,
    auth::UserID,
    profile::currency::{Currency, CurrencyId, map_currency_row},
};

/// A user's settings. A user without a profile has not finished setup.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserID,
    pub currency: Currency,
}

/// Create the profile table.
///
/// Deleting a user deletes their profile.
pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS profile (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL UNIQUE,
            currency_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(currency_id) REFERENCES currency(id) ON UPDATE CASCADE
        );",
    )?;

    Ok(())
}

/// Create the profile for `user_id` with the preferred currency `currency_id`.
///
/// # Errors
///
/// Returns [Error::InvalidReference] if either ID does not exist.
pub fn create_profile(
    user_id: UserID,
    currency_id: CurrencyId,
    connection: &Connection,
) -> Result<Profile, Error> {
    connection.execute(
        "INSERT INTO profile (user_id, currency_id) VALUES (?1, ?2);",
        (user_id.as_i64(), currency_id),
    )?;

    get_profile(user_id, connection)?.ok_or(Error::NotFound)
}

/// Get the profile of `user_id`, or `None` if the user has not finished setup.
pub fn get_profile(user_id: UserID, connection: &Connection) -> Result<Option<Profile>, Error> {
    let currency = connection
        .prepare(
            "SELECT currency.id, currency.name, currency.abbreviation, currency.symbol
             FROM profile
             INNER JOIN currency ON currency.id = profile.currency_id
             WHERE profile.user_id = :user_id;",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_currency_row)
        .optional()?;

    Ok(currency.map(|currency| Profile { user_id, currency }))
}

/// Change the preferred currency of `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has no profile, or
/// [Error::InvalidReference] if the currency does not exist.
pub fn update_profile_currency(
    user_id: UserID,
    currency_id: CurrencyId,
    connection: &Connection,
) -> Result<Profile, Error> {
    let rows_affected = connection.execute(
        "UPDATE profile SET currency_id = ?1 WHERE user_id = ?2",
        (currency_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_profile(user_id, connection)?.ok_or(Error::NotFound)
}

#[cfg(test)]
mod profile_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, UserID, Username, create_user},
        db::initialize,
        profile::get_currencies,
    };

    use super::{create_profile, get_profile, update_profile_currency};

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Username::new_unchecked("alice"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, user.id)
    }

    #[test]
    fn user_without_profile_has_none() {
        let (connection, user_id) = get_test_connection();

        assert_eq!(get_profile(user_id, &connection), Ok(None));
    }

    #[test]
    fn create_then_get_profile() {
        let (connection, user_id) = get_test_connection();
        let euro = get_currencies(&connection)
            .unwrap()
            .into_iter()
            .find(|currency| currency.abbreviation == "EUR")
            .unwrap();

        let profile = create_profile(user_id, euro.id, &connection).unwrap();

        assert_eq!(profile.currency, euro);
        assert_eq!(get_profile(user_id, &connection), Ok(Some(profile)));
    }

    #[test]
    fn create_profile_with_missing_currency_fails() {
        let (connection, user_id) = get_test_connection();

        let result = create_profile(user_id, 9999, &connection);

        assert_eq!(result, Err(Error::InvalidReference));
    }

    #[test]
    fn update_changes_currency() {
        let (connection, user_id) = get_test_connection();
        let currencies = get_currencies(&connection).unwrap();
        create_profile(user_id, currencies[0].id, &connection).unwrap();

        let profile = update_profile_currency(user_id, currencies[1].id, &connection).unwrap();

        assert_eq!(profile.currency, currencies[1]);
    }

    #[test]
    fn update_without_profile_returns_not_found() {
        let (connection, user_id) = get_test_connection();

        let result = update_profile_currency(user_id, 1, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
