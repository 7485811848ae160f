//! The session token stored as JSON in the private auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

// Two-digit hours so that midnight survives a round trip, e.g. "2025-12-21 00:00:00.0 +00:00:00".
time::serde::format_description!(
    session_expiry,
    OffsetDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
);

/// Who is logged in and until when.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,
    /// When the session ends, in the server's local timezone.
    #[serde(with = "session_expiry")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the session has ended at the instant `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
