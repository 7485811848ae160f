//! The state shared by every route of the Wallet server.
//!
//! Handlers take narrower states built from [AppState] with [FromRef], e.g.
//! the dashboard only gets the database and the timezone.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize};

#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts and signs the session cookie.
    pub cookie_key: Key,
    /// How long a new session lasts without activity.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Set up the Wallet tables and reference data in `db_connection` and wrap
    /// it for sharing between requests.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie key from the 64 byte SHA-512 hash of `secret`.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::taxonomy::get_types;

    use super::{AppState, create_cookie_key};

    #[test]
    fn new_state_has_seeded_database() {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "secret", "Etc/UTC")
            .unwrap();

        let types = get_types(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn same_secret_gives_same_key() {
        assert_eq!(
            create_cookie_key("secret").master(),
            create_cookie_key("secret").master()
        );
        assert_ne!(
            create_cookie_key("secret").master(),
            create_cookie_key("other").master()
        );
    }
}
