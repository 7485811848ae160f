//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// The maximum number of characters in a username.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A username that is non-empty, at most [MAX_USERNAME_LENGTH] characters
/// and only contains letters, digits and the characters `@.+-_`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Validate `raw_username` after trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidUsername] explaining which rule was broken.
    pub fn new(raw_username: &str) -> Result<Self, Error> {
        let username = raw_username.trim();

        if username.is_empty() {
            return Err(Error::InvalidUsername(
                "Username cannot be empty".to_owned(),
            ));
        }

        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(Error::InvalidUsername(format!(
                "Username must be at most {MAX_USERNAME_LENGTH} characters"
            )));
        }

        if let Some(invalid_char) = username
            .chars()
            .find(|c| !(c.is_alphanumeric() || "@.+-_".contains(*c)))
        {
            return Err(Error::InvalidUsername(format!(
                "Username cannot contain '{invalid_char}'. Use letters, digits and @/./+/-/_ only"
            )));
        }

        Ok(Self(username.to_owned()))
    }

    /// Create a username without validation, e.g. when reading from the database.
    pub fn new_unchecked(raw_username: &str) -> Self {
        Self(raw_username.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The optional details a user can give about themselves, empty when not given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: Username,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    pub details: PersonalDetails,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    Ok(())
}

const USER_COLUMNS: &str = "id, username, password, first_name, last_name, email";

fn map_duplicate_username(error: rusqlite::Error, username: &Username) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
        {
            Error::DuplicateUsername(username.to_string())
        }
        error => error.into(),
    }
}

/// Create and insert a new user with no personal details into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateUsername] if `username` is already taken,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    username: Username,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let id = connection
        .query_row(
            "INSERT INTO user (username, password) VALUES (?1, ?2) RETURNING id",
            (username.as_str(), password_hash.as_ref()),
            |row| row.get(0),
        )
        .map_err(|error| map_duplicate_username(error, &username))?;

    Ok(User {
        id: UserID::new(id),
        username,
        password_hash,
        details: PersonalDetails::default(),
    })
}

/// Replace the username and personal details of the user with `user_id`.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateUsername] if another user has `username`,
/// - [Error::NotFound] if no user has the ID `user_id`.
pub fn update_account(
    user_id: UserID,
    username: &Username,
    details: &PersonalDetails,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .query_row(
            &format!(
                "UPDATE user SET username = ?1, first_name = ?2, last_name = ?3, email = ?4
                WHERE id = ?5 RETURNING {USER_COLUMNS}"
            ),
            (
                username.as_str(),
                &details.first_name,
                &details.last_name,
                &details.email,
                user_id.as_i64(),
            ),
            map_user_row,
        )
        .map_err(|error| map_duplicate_username(error, username))
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user with the given `username`.
///
/// Usernames are matched exactly.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has that username.
pub fn get_user_by_username(username: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user WHERE username = :username"
        ))?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user named `username`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has that username.
pub fn update_password(
    username: &str,
    password_hash: &PasswordHash,
    db_connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = db_connection.execute(
        "UPDATE user SET password = ?1 WHERE username = ?2",
        (password_hash.as_ref(), username),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let raw_username: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(raw_id),
        username: Username::new_unchecked(&raw_username),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        details: PersonalDetails {
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            email: row.get(5)?,
        },
    })
}


#[cfg(test)]
mod username_tests {
    use crate::Error;

    use super::{MAX_USERNAME_LENGTH, Username};

    #[test]
    fn trims_whitespace() {
        assert_eq!(Username::new("  alice ").unwrap().as_str(), "alice");
    }

    #[test]
    fn rejects_empty_username() {
        assert!(matches!(
            Username::new("   "),
            Err(Error::InvalidUsername(_))
        ));
    }

    #[test]
    fn rejects_long_username() {
        let username = "a".repeat(MAX_USERNAME_LENGTH + 1);

        assert!(matches!(
            Username::new(&username),
            Err(Error::InvalidUsername(_))
        ));
    }

    #[test]
    fn rejects_spaces_and_symbols() {
        assert!(Username::new("alice smith").is_err());
        assert!(Username::new("alice!").is_err());
        assert!(Username::new("alice.smith+wallet@example-1_2").is_ok());
    }
}
