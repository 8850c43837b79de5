//! User identity record and its persisted JSON form.

use serde::{Deserialize, Serialize};

/// Display name assigned to phone logins (the mock verification flow has no
/// profile service to ask).
pub const PHONE_USER_NAME: &str = "手机用户";

/// An authenticated identity. At most one `User` is current at any time;
/// absence of a current user means "unauthenticated".
///
/// The serialized form is flat camelCase JSON (`avatarUrl`), matching the
/// record layout the credential store has always held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique id, assigned at login time (`phone_<unix-ms>` or
    /// provider-prefixed for social logins).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Present only for phone-based logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Present only for social logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    /// Synthesize the identity for a verified phone login.
    #[must_use]
    pub fn from_phone(phone: &str) -> Self {
        Self {
            id: format!("phone_{}", unix_millis()),
            name: PHONE_USER_NAME.to_owned(),
            phone: Some(phone.to_owned()),
            avatar_url: None,
        }
    }
}

/// Milliseconds since the Unix epoch, used as the unique suffix of login ids.
#[must_use]
pub fn unix_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
