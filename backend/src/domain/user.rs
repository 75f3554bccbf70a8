//! User identity types.
//!
//! Accounts are owned by the external identity provider; the backend keeps a
//! thin local mirror (id, email, display name, avatar) so events and
//! registrations can join against user rows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Strongly typed user identifier (UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID value.
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identity returned by the token verifier.
///
/// The display name falls back to the mailbox part of the email address when
/// the provider supplies no name, matching the provider-side default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Provider-issued user identifier.
    pub id: UserId,
    /// Verified email address.
    pub email: String,
    /// Display name from provider metadata.
    pub display_name: String,
    /// Avatar URL from provider metadata, if any.
    pub avatar_url: Option<String>,
}

impl AuthenticatedUser {
    /// Derive a display name from provider metadata or the email mailbox.
    pub fn display_name_or_mailbox(name: Option<String>, email: &str) -> String {
        match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => email
                .split('@')
                .next()
                .filter(|mailbox| !mailbox.is_empty())
                .unwrap_or("User")
                .to_owned(),
        }
    }
}

/// Public user summary embedded in event and registration payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL, if set.
    pub avatar_url: Option<String>,
}
