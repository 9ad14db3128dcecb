//! Opaque session tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: Uuid,
    pub expired_at: DateTime<Utc>,
}

impl Token {
    /// Issues a fresh token from a random v4 UUID (122 random bits).
    pub fn issue(duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            expired_at: Utc::now() + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        is_expired(self.expired_at)
    }
}

/// Checked against the wall clock on every call.
pub fn is_expired(expired_at: DateTime<Utc>) -> bool {
    is_expired_at(expired_at, Utc::now())
}

/// A token whose expiry instant is at or before `now` is expired.
pub fn is_expired_at(expired_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expired_at <= now
}

/// Accepts only the lowercase hyphenated form tokens are issued in.
///
/// `Uuid::parse_str` alone would also take the simple, braced and `urn:uuid:` spellings.
pub fn parse_token_id(raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    let id = Uuid::parse_str(raw).ok()?;
    let mut buf = Uuid::encode_buffer();
    let canonical: &str = id.hyphenated().encode_lower(&mut buf);
    (canonical == raw).then_some(id)
}
