//! Internal Diesel row structs and their domain conversions.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Enum columns are stored as strings, and unrecognised values fall
//! back to documented defaults with a warning rather than failing the read.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::domain::event::{CoverImage, Event, EventStatus, LocationType, NewEvent};
use crate::domain::preferences::{
    NotificationSettings, PreferredLocation, PrivacySettings, UserPreferences,
};
use crate::domain::registration::{Registration, RegistrationStatus};
use crate::domain::user::{UserId, UserSummary};

use super::schema::{events, registrations, user_preferences, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    #[expect(dead_code, reason = "audit column not surfaced in API payloads")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "audit column not surfaced in API payloads")]
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserSummary {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            display_name: row.display_name,
            email: row.email,
            avatar_url: row.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub avatar_url: Option<&'a str>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserRefresh<'a> {
    pub email: &'a str,
    pub display_name: &'a str,
    pub avatar_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub cover_image: Option<Value>,
    pub location_type: String,
    pub address: Option<String>,
    pub city: String,
    pub country: String,
    pub coordinates: Option<Value>,
    pub virtual_link: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub capacity: Option<i32>,
    pub ticket_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_enum_column<T: FromStr + Default>(raw: &str, column: &str, row: Uuid) -> T {
    T::from_str(raw).unwrap_or_else(|_| {
        warn!(value = raw, column, %row, "unrecognised enum value, using default");
        T::default()
    })
}

fn parse_cover_image(value: Option<Value>, row: Uuid) -> Option<CoverImage> {
    value.and_then(|raw| match serde_json::from_value(raw) {
        Ok(image) => Some(image),
        Err(error) => {
            warn!(%error, %row, "cover_image column holds malformed JSON, dropping it");
            None
        }
    })
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        let id = row.id;
        Self {
            id: row.id,
            creator_id: UserId::from_uuid(row.creator_id),
            title: row.title,
            description: row.description,
            categories: row.categories,
            cover_image: parse_cover_image(row.cover_image, id),
            location_type: parse_enum_column(&row.location_type, "location_type", id),
            address: row.address,
            city: row.city,
            country: row.country,
            coordinates: row.coordinates,
            virtual_link: row.virtual_link,
            start_time: row.start_time,
            end_time: row.end_time,
            timezone: row.timezone,
            capacity: row.capacity,
            ticket_price: row.ticket_price,
            status: parse_enum_column(&row.status, "status", id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub cover_image: Option<Value>,
    pub location_type: String,
    pub address: Option<String>,
    pub city: String,
    pub country: String,
    pub coordinates: Option<Value>,
    pub virtual_link: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub capacity: Option<i32>,
    pub ticket_price: f64,
    pub status: String,
}

impl NewEventRow {
    pub(crate) fn from_domain(event: NewEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id: event.creator_id.as_uuid(),
            title: event.title,
            description: event.description,
            categories: event.categories,
            cover_image: event
                .cover_image
                .map(|image| serde_json::json!({ "url": image.url, "alt": image.alt })),
            location_type: event.location_type.as_str().to_owned(),
            address: event.address,
            city: event.city,
            country: event.country,
            coordinates: event.coordinates,
            virtual_link: event.virtual_link,
            start_time: event.start_time,
            end_time: event.end_time,
            timezone: event.timezone,
            capacity: event.capacity,
            ticket_price: event.ticket_price,
            status: event.status.as_str().to_owned(),
        }
    }
}

/// Changeset for partial event updates. `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = events)]
pub(crate) struct EventChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub cover_image: Option<Value>,
    pub location_type: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Value>,
    pub virtual_link: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub capacity: Option<i32>,
    pub ticket_price: Option<f64>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EventChangeset {
    pub(crate) fn from_patch(patch: &crate::domain::event::EventPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            categories: patch.categories.clone(),
            cover_image: patch
                .cover_image
                .as_ref()
                .map(|image| serde_json::json!({ "url": image.url, "alt": image.alt })),
            location_type: patch.location_type.map(|v| v.as_str().to_owned()),
            address: patch.address.clone(),
            city: patch.city.clone(),
            country: patch.country.clone(),
            coordinates: patch.coordinates.clone(),
            virtual_link: patch.virtual_link.clone(),
            start_time: patch.start_time,
            end_time: patch.end_time,
            timezone: patch.timezone.clone(),
            capacity: patch.capacity,
            ticket_price: patch.ticket_price,
            status: patch.status.map(|v| v.as_str().to_owned()),
            updated_at: Some(Utc::now()),
        }
    }
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        let status = RegistrationStatus::from_str(&row.status).unwrap_or_else(|_| {
            warn!(value = row.status, row = %row.id, "unrecognised registration status, treating as cancelled");
            RegistrationStatus::Cancelled
        });
        Self {
            id: row.id,
            event_id: row.event_id,
            user_id: UserId::from_uuid(row.user_id),
            status,
            registered_at: row.registered_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub(crate) struct NewRegistrationRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PreferencesRow {
    pub user_id: Uuid,
    pub interests: Vec<String>,
    pub location: Option<Value>,
    pub notification_settings: Value,
    pub privacy_settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn decode_json_column<T: serde::de::DeserializeOwned + Default>(
    value: Value,
    column: &str,
    row: Uuid,
) -> T {
    serde_json::from_value(value).unwrap_or_else(|error| {
        warn!(%error, column, %row, "malformed JSON column, using defaults");
        T::default()
    })
}

impl From<PreferencesRow> for UserPreferences {
    fn from(row: PreferencesRow) -> Self {
        let user = row.user_id;
        Self {
            user_id: UserId::from_uuid(row.user_id),
            interests: row.interests,
            location: row
                .location
                .and_then(|raw| serde_json::from_value::<PreferredLocation>(raw).ok()),
            notification_settings: decode_json_column::<NotificationSettings>(
                row.notification_settings,
                "notification_settings",
                user,
            ),
            privacy_settings: decode_json_column::<PrivacySettings>(
                row.privacy_settings,
                "privacy_settings",
                user,
            ),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_preferences)]
pub(crate) struct NewPreferencesRow {
    pub user_id: Uuid,
    pub interests: Vec<String>,
    pub location: Option<Value>,
    pub notification_settings: Value,
    pub privacy_settings: Value,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = user_preferences)]
pub(crate) struct PreferencesRefresh {
    pub interests: Vec<String>,
    pub location: Option<Value>,
    pub notification_settings: Value,
    pub privacy_settings: Value,
    pub updated_at: DateTime<Utc>,
}
