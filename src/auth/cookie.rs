//! The session cookie.
//!
//! A session is one private (encrypted) cookie holding a JSON [Token]. Its
//! expiry is pushed back while the user keeps making requests.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use cookie::CookieBuilder;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::{Token, UserID},
};

/// The name of the cookie that holds the session token.
pub(crate) const COOKIE_TOKEN: &str = "token";
/// How long a session lasts without activity unless the user asks to be remembered.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

fn session_cookie(value: String) -> CookieBuilder<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
}

fn store_token(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(session_cookie(value).expires(token.expires_at)))
}

/// Start a session for `user_id` that ends `duration` from now.
///
/// The expiry is recorded in the server's timezone, `local_offset`.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = Token {
        user_id,
        expires_at: OffsetDateTime::now_utc().to_offset(local_offset) + duration,
    };

    store_token(jar, &token)
}

/// Overwrite the session cookie with one the browser deletes straight away.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        session_cookie("deleted".to_owned())
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO),
    )
}

/// The unexpired session token in `jar`.
///
/// # Errors
/// Returns [Error::CookieMissing] without a session cookie, and
/// [Error::InvalidCredentials] for a cookie that is unreadable or expired.
pub(crate) fn read_session(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed()).map_err(|error| {
        tracing::debug!("could not parse auth token: {error}");
        Error::InvalidCredentials
    })?;

    if token.is_expired_at(OffsetDateTime::now_utc()) {
        return Err(Error::InvalidCredentials);
    }

    Ok(token)
}

/// Keep the session in `jar` alive for at least `extension` from now.
///
/// Sessions that already last longer, e.g. remembered ones, keep their expiry.
///
/// # Errors
/// Fails like [read_session], or with [Error::InvalidDateFormat] when the new
/// expiry is out of range. `jar` is unchanged on error.
pub(crate) fn refresh_session(
    jar: PrivateCookieJar,
    extension: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let mut token = read_session(&jar)?;

    let extended = OffsetDateTime::now_utc()
        .to_offset(local_offset)
        .checked_add(extension)
        .ok_or_else(|| {
            Error::InvalidDateFormat("date time overflow".to_owned(), format!("now + {extension}"))
        })?;
    token.expires_at = token.expires_at.max(extended);

    store_token(jar, &token)
}
