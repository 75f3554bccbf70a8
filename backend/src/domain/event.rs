//! Event aggregate and listing filters.
//!
//! An event describes a gathering (physical, virtual, or hybrid) with a time
//! window, place, optional capacity, and ticket price. Status transitions are
//! not modelled as a state machine; the column is a plain enum domain and
//! listing defaults to published events only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{UserId, UserSummary};

/// Where an event takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    /// In-person event at a street address.
    #[default]
    Physical,
    /// Online-only event reachable via a link.
    Virtual,
    /// Mixed in-person and online attendance.
    Hybrid,
}

impl LocationType {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Virtual => "virtual",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(Self::Physical),
            "virtual" => Ok(Self::Virtual),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(ParseEnumError {
                kind: "location type",
                input: s.to_owned(),
            }),
        }
    }
}

/// Publication state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Visible only to the creator.
    Draft,
    /// Discoverable and open for registration.
    #[default]
    Published,
    /// Cancelled by the creator.
    Cancelled,
    /// Past its end time.
    Completed,
}

impl EventStatus {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                kind: "event status",
                input: s.to_owned(),
            }),
        }
    }
}

/// Error returned when parsing an unknown enum string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {input}")]
pub struct ParseEnumError {
    /// Which enum failed to parse.
    pub kind: &'static str,
    /// The unrecognised input value.
    pub input: String,
}

/// Cover image attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    /// Image URL.
    pub url: String,
    /// Accessible alternative text.
    pub alt: String,
}

/// A persisted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: Uuid,
    /// Owning user.
    pub creator_id: UserId,
    /// Event title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Category tags.
    pub categories: Vec<String>,
    /// Cover image, if one is set.
    pub cover_image: Option<CoverImage>,
    /// Physical, virtual, or hybrid.
    pub location_type: LocationType,
    /// Street address for physical events.
    pub address: Option<String>,
    /// City name.
    pub city: String,
    /// Country name.
    pub country: String,
    /// Opaque coordinates blob; the backend never interprets it.
    pub coordinates: Option<Value>,
    /// Join link for virtual events.
    pub virtual_link: Option<String>,
    /// Start of the event window.
    pub start_time: DateTime<Utc>,
    /// End of the event window.
    pub end_time: DateTime<Utc>,
    /// IANA timezone name for display.
    pub timezone: String,
    /// Maximum confirmed registrations; unlimited when absent.
    pub capacity: Option<i32>,
    /// Ticket price; zero means free.
    pub ticket_price: f64,
    /// Publication state.
    pub status: EventStatus,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Owning user.
    pub creator_id: UserId,
    /// Event title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Category tags.
    pub categories: Vec<String>,
    /// Cover image, if any.
    pub cover_image: Option<CoverImage>,
    /// Physical, virtual, or hybrid.
    pub location_type: LocationType,
    /// Street address for physical events.
    pub address: Option<String>,
    /// City name.
    pub city: String,
    /// Country name.
    pub country: String,
    /// Opaque coordinates blob.
    pub coordinates: Option<Value>,
    /// Join link for virtual events.
    pub virtual_link: Option<String>,
    /// Start of the event window.
    pub start_time: DateTime<Utc>,
    /// End of the event window.
    pub end_time: DateTime<Utc>,
    /// IANA timezone name.
    pub timezone: String,
    /// Maximum confirmed registrations.
    pub capacity: Option<i32>,
    /// Ticket price.
    pub ticket_price: f64,
    /// Publication state.
    pub status: EventStatus,
}

/// Partial update applied to an existing event.
///
/// `None` fields are left unchanged. Nullable columns cannot be cleared
/// through a patch; the original application never does either.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement category tags.
    pub categories: Option<Vec<String>>,
    /// Replacement cover image.
    pub cover_image: Option<CoverImage>,
    /// Replacement location type.
    pub location_type: Option<LocationType>,
    /// Replacement address.
    pub address: Option<String>,
    /// Replacement city.
    pub city: Option<String>,
    /// Replacement country.
    pub country: Option<String>,
    /// Replacement coordinates blob.
    pub coordinates: Option<Value>,
    /// Replacement join link.
    pub virtual_link: Option<String>,
    /// Replacement start time.
    pub start_time: Option<DateTime<Utc>>,
    /// Replacement end time.
    pub end_time: Option<DateTime<Utc>>,
    /// Replacement timezone.
    pub timezone: Option<String>,
    /// Replacement capacity.
    pub capacity: Option<i32>,
    /// Replacement ticket price.
    pub ticket_price: Option<f64>,
    /// Replacement status.
    pub status: Option<EventStatus>,
}

impl EventPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// An event joined with its creator's public summary.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWithCreator {
    /// The event record.
    pub event: Event,
    /// The owning user's public summary.
    pub creator: UserSummary,
}

/// Sort key for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSortKey {
    /// Order by event start time.
    #[default]
    StartTime,
    /// Order by ticket price.
    TicketPrice,
    /// Order by creation time.
    CreatedAt,
}

/// Sort direction for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Default page size for event listings.
pub const DEFAULT_PAGE_SIZE: u32 = 6;
/// Upper bound on requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Filter, sort, and pagination parameters for event listings.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
    /// Match events sharing at least one of these categories.
    pub categories: Option<Vec<String>>,
    /// Case-insensitive substring match on city.
    pub city: Option<String>,
    /// Case-insensitive substring match on country.
    pub country: Option<String>,
    /// Only events starting at or after this instant.
    pub starts_after: Option<DateTime<Utc>>,
    /// Only events starting at or before this instant.
    pub starts_before: Option<DateTime<Utc>>,
    /// Minimum ticket price.
    pub min_price: Option<f64>,
    /// Maximum ticket price.
    pub max_price: Option<f64>,
    /// Restrict to one location type.
    pub location_type: Option<LocationType>,
    /// Publication state; listings default to published.
    pub status: EventStatus,
    /// Sort key.
    pub sort_by: EventSortKey,
    /// Sort direction.
    pub sort_order: SortOrder,
    /// 1-based page number.
    pub page: u32,
    /// Page size, clamped to [`MAX_PAGE_SIZE`].
    pub limit: u32,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            search: None,
            categories: None,
            city: None,
            country: None,
            starts_after: None,
            starts_before: None,
            min_price: None,
            max_price: None,
            location_type: None,
            status: EventStatus::Published,
            sort_by: EventSortKey::default(),
            sort_order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EventFilter {
    /// Number of rows to skip for the requested page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    /// Clamp page and limit into their valid ranges.
    pub fn normalised(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// One page of events plus the total row count for the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    /// Events in the requested page order.
    pub events: Vec<EventWithCreator>,
    /// Total rows matching the filter across all pages.
    pub total: i64,
    /// 1-based page number served.
    pub page: u32,
    /// Page size used.
    pub limit: u32,
}
