//! Domain ports implemented by outbound adapters.
//!
//! Services depend on these traits only; PostgreSQL, the LLM provider, the
//! image providers, the identity provider, and the cache all live behind
//! them. Error enums are adapter-facing and get translated into the domain
//! [`Error`] at the service boundary.

use async_trait::async_trait;
use uuid::Uuid;

use super::error::Error;
use super::event::{Event, EventFilter, EventPage, EventPatch, EventWithCreator, NewEvent};
use super::generation::{CandidateImage, GeneratedBanner, GenerationResult, Prompt};
use super::preferences::{PreferencesUpsert, UserPreferences};
use super::registration::{
    Attendee, Registration, RegistrationStatus, RegistrationWithEvent,
};
use super::user::{AuthenticatedUser, UserId};

/// Errors raised by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A connection could not be checked out or established.
    #[error("repository connection failed: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("repository query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
}

impl RepositoryError {
    /// Connection-level failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-level failure.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Connection { .. } => {
                Self::service_unavailable("database unavailable")
            }
            RepositoryError::Query { .. } => Self::internal("database error"),
        }
    }
}

/// Errors raised by outbound HTTP provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The provider rejected the request as malformed.
    #[error("provider rejected request: {message}")]
    InvalidRequest {
        /// Adapter-provided description.
        message: String,
    },
    /// The credential was missing, invalid, or expired.
    #[error("provider rejected credentials: {message}")]
    Unauthorized {
        /// Adapter-provided description.
        message: String,
    },
    /// The provider throttled the request.
    #[error("provider rate limited request: {message}")]
    RateLimited {
        /// Adapter-provided description.
        message: String,
    },
    /// The request or the provider timed out.
    #[error("provider timed out: {message}")]
    Timeout {
        /// Adapter-provided description.
        message: String,
    },
    /// Any other transport-level failure.
    #[error("provider transport failed: {message}")]
    Transport {
        /// Adapter-provided description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("provider response could not be decoded: {message}")]
    Decode {
        /// Adapter-provided description.
        message: String,
    },
}

impl SourceError {
    /// Provider rejected the request.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Provider rejected the credentials.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Provider throttled the request.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Request or provider timed out.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Transport-level failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Response decoding failure.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for event persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event and return the stored row.
    async fn insert(&self, event: NewEvent) -> Result<Event, RepositoryError>;

    /// Fetch one event with its creator summary.
    async fn fetch(&self, id: Uuid) -> Result<Option<EventWithCreator>, RepositoryError>;

    /// Fetch one event without joining the creator. Used for ownership and
    /// registration checks.
    async fn fetch_basic(&self, id: Uuid) -> Result<Option<Event>, RepositoryError>;

    /// List events matching the filter, with the total count for pagination.
    async fn list(&self, filter: &EventFilter) -> Result<EventPage, RepositoryError>;

    /// Apply a partial update. Returns `None` when the event does not exist.
    async fn update(&self, id: Uuid, patch: &EventPatch)
    -> Result<Option<Event>, RepositoryError>;

    /// Delete an event. Returns false when the event did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Port for registration persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Find the registration row for a user/event pair, regardless of status.
    async fn find(
        &self,
        event_id: Uuid,
        user_id: &UserId,
    ) -> Result<Option<Registration>, RepositoryError>;

    /// Insert a new confirmed registration.
    async fn insert_confirmed(
        &self,
        event_id: Uuid,
        user_id: &UserId,
    ) -> Result<Registration, RepositoryError>;

    /// Flip the status of an existing registration row.
    async fn set_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Registration, RepositoryError>;

    /// Count confirmed registrations for an event.
    async fn confirmed_count(&self, event_id: Uuid) -> Result<i64, RepositoryError>;

    /// Confirmed registrations with attendee summaries, oldest first.
    async fn attendees(&self, event_id: Uuid) -> Result<Vec<Attendee>, RepositoryError>;

    /// A user's confirmed registrations with event details, newest first.
    async fn confirmed_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RegistrationWithEvent>, RepositoryError>;
}

/// Port for user-preferences persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Fetch a user's preferences, if any were saved.
    async fn fetch(&self, user_id: &UserId) -> Result<Option<UserPreferences>, RepositoryError>;

    /// Create or replace a user's preferences.
    async fn upsert(&self, upsert: &PreferencesUpsert)
    -> Result<UserPreferences, RepositoryError>;

    /// Delete a user's preferences. Returns false when none existed.
    async fn delete(&self, user_id: &UserId) -> Result<bool, RepositoryError>;
}

/// Port for the local mirror of identity-provider accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert or refresh the local row for a verified identity.
    async fn upsert(&self, user: &AuthenticatedUser) -> Result<(), RepositoryError>;
}

/// Port for the language-model drafting provider.
///
/// Returns the model's raw completion text; parsing and normalisation are
/// domain concerns (see [`super::generation::parse_draft`]).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventDrafter: Send + Sync {
    /// Request a draft completion for the prompt.
    async fn complete(&self, prompt: &Prompt) -> Result<String, SourceError>;
}

/// Port for stock-photo search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Search landscape photos for a keyword query.
    async fn search(&self, query: &str, count: u32) -> Result<Vec<CandidateImage>, SourceError>;
}

/// Port for text-to-image banner generation.
///
/// Returns raw image bytes; base64 encoding happens in the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerGenerator: Send + Sync {
    /// Generate an image for the prompt.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, SourceError>;
}

/// Port for bearer-token verification against the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a bearer token and return the identity it belongs to.
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, SourceError>;
}

/// Port for the best-effort generation cache.
///
/// Implementations are in-process and synchronous. Expiry is checked on
/// read; there is no other eviction.
#[cfg_attr(test, mockall::automock)]
pub trait GenerationCache: Send + Sync {
    /// Fetch a cached pipeline result, if present and fresh.
    fn get_result(&self, key: &str) -> Option<GenerationResult>;

    /// Store a pipeline result.
    fn put_result(&self, key: &str, result: GenerationResult);

    /// Fetch a cached banner, if present and fresh.
    fn get_banner(&self, key: &str) -> Option<GeneratedBanner>;

    /// Store a banner.
    fn put_banner(&self, key: &str, banner: GeneratedBanner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn repository_errors_map_to_expected_domain_codes() {
        let unavailable: Error = RepositoryError::connection("refused").into();
        assert_eq!(unavailable.code(), ErrorCode::ServiceUnavailable);

        let internal: Error = RepositoryError::query("bad sql").into();
        assert_eq!(internal.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn source_error_constructors_carry_messages() {
        assert_eq!(
            SourceError::rate_limited("slow down").to_string(),
            "provider rate limited request: slow down"
        );
        assert_eq!(
            SourceError::decode("bad json").to_string(),
            "provider response could not be decoded: bad json"
        );
    }
}
