//! Registration (RSVP) types.
//!
//! A registration joins a user to an event. The pair is unique in the
//! database; cancelling flips the status rather than deleting the row, so a
//! later re-registration reactivates the same record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::event::Event;
use super::user::{UserId, UserSummary};

/// Lifecycle state of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Active RSVP counted against capacity.
    Confirmed,
    /// Withdrawn RSVP; the row is retained for reactivation.
    Cancelled,
}

impl RegistrationStatus {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = super::event::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(super::event::ParseEnumError {
                kind: "registration status",
                input: s.to_owned(),
            }),
        }
    }
}

/// A persisted registration row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Registration identifier.
    pub id: Uuid,
    /// The event registered for.
    pub event_id: Uuid,
    /// The registering user.
    pub user_id: UserId,
    /// Confirmed or cancelled.
    pub status: RegistrationStatus,
    /// When the registration was first created.
    pub registered_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Result of a register call, noting whether a cancelled row was revived.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    /// The confirmed registration.
    pub registration: Registration,
    /// True when an existing cancelled row was reactivated instead of a new
    /// row being inserted.
    pub reactivated: bool,
}

/// A confirmed registration joined with the attendee's summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Attendee {
    /// The registration row.
    pub registration: Registration,
    /// The registered user.
    pub user: UserSummary,
}

/// A registration joined with its event and the event's creator.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationWithEvent {
    /// The registration row.
    pub registration: Registration,
    /// The event registered for.
    pub event: Event,
    /// The event creator's summary.
    pub creator: UserSummary,
}

/// Capacity and registration state of an event for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySummary {
    /// Whether the viewer holds a confirmed registration.
    pub is_registered: bool,
    /// Whether confirmed registrations have reached capacity.
    pub is_full: bool,
    /// Number of confirmed registrations.
    pub confirmed_count: i64,
    /// Event capacity; unlimited when absent.
    pub capacity: Option<i32>,
    /// Remaining spots; absent for unlimited events.
    pub available_spots: Option<i64>,
}

impl AvailabilitySummary {
    /// Derive availability from a confirmed count, optional capacity, and the
    /// viewer's registration state.
    pub fn derive(confirmed_count: i64, capacity: Option<i32>, is_registered: bool) -> Self {
        let is_full = capacity.is_some_and(|cap| confirmed_count >= i64::from(cap));
        let available_spots = capacity.map(|cap| (i64::from(cap) - confirmed_count).max(0));
        Self {
            is_registered,
            is_full,
            confirmed_count,
            capacity,
            available_spots,
        }
    }
}
